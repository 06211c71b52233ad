//! Incremental decoding of a chunked body into frames.

use crate::sse::events::StreamFrame;
use crate::sse::parser::parse_frame_line;

const REPLACEMENT: char = '\u{FFFD}';

/// Stateful UTF-8 decoder.
///
/// A multi-byte character split across chunks is held back until its
/// remaining bytes arrive. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as possible.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut input: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            input = &rest[len..];
                        }
                        None => {
                            // Truncated sequence at the end: wait for more.
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        let consumed = self.pending.len() - input.len();
        self.pending.drain(..consumed);
        out
    }

    /// End of input. A truncated trailing sequence becomes U+FFFD.
    pub fn flush(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }

    /// Bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits a decoded body into `\n`-terminated lines and frames them.
///
/// The unterminated tail stays buffered across [`feed`](Self::feed) calls.
/// It is never framed: [`finish`](Self::finish) hands it back unparsed once
/// the body has ended.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Decoder,
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, returning the frames of every line it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        let mut frames = Vec::new();
        let mut consumed = 0;
        for (idx, _) in self.buffer.match_indices('\n') {
            if let Some(frame) = parse_frame_line(&self.buffer[consumed..idx]) {
                frames.push(frame);
            }
            consumed = idx + 1;
        }
        self.buffer.drain(..consumed);

        frames
    }

    /// Drop whatever is left once the body has ended, returning it.
    pub fn finish(&mut self) -> String {
        let tail = self.utf8.flush();
        self.buffer.push_str(&tail);
        std::mem::take(&mut self.buffer)
    }

    /// Text received but not yet terminated by a newline.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> StreamFrame {
        StreamFrame::Data(s.to_string())
    }

    #[test]
    fn test_utf8_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_utf8_split_multibyte() {
        // "é" is C3 A9
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xC3]), "a");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.decode(&[0xA9, b'b']), "éb");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_utf8_four_byte_split_three_ways() {
        // U+1F600 is F0 9F 98 80
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xF0]), "");
        assert_eq!(decoder.decode(&[0x9F, 0x98]), "");
        assert_eq!(decoder.decode(&[0x80]), "\u{1F600}");
    }

    #[test]
    fn test_utf8_invalid_bytes_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
        assert_eq!(decoder.decode(&[0xC3, b'x']), "\u{FFFD}x");
    }

    #[test]
    fn test_utf8_flush_truncated_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'z', 0xE4, 0xB8]), "z");
        assert_eq!(decoder.flush(), "\u{FFFD}");
        assert_eq!(decoder.flush(), "");
    }

    #[test]
    fn test_feed_complete_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data:Hel\ndata:lo\n\n");
        assert_eq!(frames, vec![data("Hel"), data("lo")]);
        assert_eq!(decoder.buffered(), "");
    }

    #[test]
    fn test_feed_keeps_partial_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data:Hel").is_empty());
        assert_eq!(decoder.buffered(), "data:Hel");

        let frames = decoder.feed(b"lo\ndata:[DONE]\n");
        assert_eq!(frames, vec![data("Hello"), StreamFrame::Done]);
    }

    #[test]
    fn test_feed_split_character_inside_line() {
        let mut decoder = FrameDecoder::new();
        let bytes = "data:日本\n".as_bytes();
        assert!(decoder.feed(&bytes[..7]).is_empty());
        assert_eq!(decoder.feed(&bytes[7..]), vec![data("日本")]);
    }

    #[test]
    fn test_feed_crlf_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"data:a\r\n\r\ndata:[DONE]\r\n");
        assert_eq!(frames, vec![data("a"), StreamFrame::Done]);
    }

    #[test]
    fn test_finish_discards_trailing_line() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(b"data:x\ndata:[ERROR]bad"), vec![data("x")]);
        assert_eq!(decoder.finish(), "data:[ERROR]bad");
        assert_eq!(decoder.buffered(), "");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_finish_with_nothing_buffered() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"data:x\n");
        assert_eq!(decoder.finish(), "");
    }
}
