use crate::error::StreamError;

/// Receives the pieces of one streamed reply.
///
/// `on_chunk` is called zero or more times, in arrival order. Then exactly
/// one of `on_complete` or `on_error` is called, and nothing after it.
pub trait StreamHandler {
    fn on_chunk(&mut self, chunk: &str);

    fn on_complete(&mut self);

    fn on_error(&mut self, error: StreamError);
}

/// [`StreamHandler`] built from three closures.
///
/// ```ignore
/// let mut reply = String::new();
/// let mut handler = StreamCallbacks::new(
///     |chunk| reply.push_str(chunk),
///     || println!(),
///     |err| eprintln!("{}", err),
/// );
/// client.send_message_stream(&request, &mut handler).await;
/// ```
pub struct StreamCallbacks<C, D, E>
where
    C: FnMut(&str),
    D: FnMut(),
    E: FnMut(StreamError),
{
    on_chunk: C,
    on_complete: D,
    on_error: E,
}

impl<C, D, E> StreamCallbacks<C, D, E>
where
    C: FnMut(&str),
    D: FnMut(),
    E: FnMut(StreamError),
{
    pub fn new(on_chunk: C, on_complete: D, on_error: E) -> Self {
        Self {
            on_chunk,
            on_complete,
            on_error,
        }
    }
}

impl<C, D, E> StreamHandler for StreamCallbacks<C, D, E>
where
    C: FnMut(&str),
    D: FnMut(),
    E: FnMut(StreamError),
{
    fn on_chunk(&mut self, chunk: &str) {
        (self.on_chunk)(chunk)
    }

    fn on_complete(&mut self) {
        (self.on_complete)()
    }

    fn on_error(&mut self, error: StreamError) {
        (self.on_error)(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callbacks_forward() {
        let mut chunks = Vec::new();
        let mut completed = 0;
        let mut errors = Vec::new();

        {
            let mut handler = StreamCallbacks::new(
                |chunk: &str| chunks.push(chunk.to_string()),
                || completed += 1,
                |err: StreamError| errors.push(err),
            );
            handler.on_chunk("a");
            handler.on_chunk("b");
            handler.on_complete();
            handler.on_error(StreamError::Server("x".to_string()));
        }

        assert_eq!(chunks, vec!["a", "b"]);
        assert_eq!(completed, 1);
        assert_eq!(errors, vec![StreamError::Server("x".to_string())]);
    }
}
