//! Command-line argument parsing for monitor-assist.

/// Usage text printed by `--help` and on argument errors.
pub const USAGE: &str = "\
Usage: monitor-assist <command> [args]

Commands:
  chat --session <id> [--model <name>] <message...>
                             Stream an AI reply for one message
  assist <ai-session-id>     Interactive SSH assistant over WebSocket
  bind <ssh-session-id> <agent-id>
                             Attach a new AI session to an SSH session
  sessions                   List chat sessions

Options:
  -h, --help                 Show this help
  -V, --version              Show version

Environment:
  MONITOR_API_BASE_URL, MONITOR_AI_API_BASE_URL, MONITOR_WS_BASE_URL,
  MONITOR_AUTH_TOKEN, MONITOR_LOG, MONITOR_LOG_FORMAT";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream one reply to stdout
    Chat {
        session_id: String,
        model: Option<String>,
        message: String,
    },
    /// Interactive WebSocket session
    Assist { session_id: String },
    /// Bind an AI session to an SSH session
    Bind {
        ssh_session_id: String,
        agent_id: String,
    },
    /// List chat sessions
    Sessions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("option '{0}' needs a value")]
    MissingValue(String),
    #[error("unexpected argument '{0}'")]
    Unexpected(String),
}

/// Parse command-line arguments (program name first).
///
/// # Examples
///
/// ```
/// use monitor_assist::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["monitor-assist".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);

    let Some(command) = args.next() else {
        return Ok(CliCommand::Help);
    };

    match command.as_str() {
        "--version" | "-V" => Ok(CliCommand::Version),
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        "chat" => parse_chat(args),
        "assist" => {
            let session_id = args.next().ok_or(ArgsError::Missing("AI session id"))?;
            no_more(args)?;
            Ok(CliCommand::Assist { session_id })
        }
        "bind" => {
            let ssh_session_id = args.next().ok_or(ArgsError::Missing("SSH session id"))?;
            let agent_id = args.next().ok_or(ArgsError::Missing("agent id"))?;
            no_more(args)?;
            Ok(CliCommand::Bind {
                ssh_session_id,
                agent_id,
            })
        }
        "sessions" => {
            no_more(args)?;
            Ok(CliCommand::Sessions)
        }
        other if other.starts_with('-') => Err(ArgsError::UnknownOption(other.to_string())),
        other => Err(ArgsError::UnknownCommand(other.to_string())),
    }
}

fn parse_chat<I>(mut args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut session_id = None;
    let mut model = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--session" | "-s" => {
                session_id = Some(args.next().ok_or(ArgsError::MissingValue(arg))?);
            }
            "--model" | "-m" => {
                model = Some(args.next().ok_or(ArgsError::MissingValue(arg))?);
            }
            "--" => {
                words.extend(args.by_ref());
            }
            flag if flag.starts_with("--") => {
                return Err(ArgsError::UnknownOption(flag.to_string()));
            }
            _ => words.push(arg),
        }
    }

    let session_id = session_id.ok_or(ArgsError::Missing("--session <id>"))?;
    if words.is_empty() {
        return Err(ArgsError::Missing("message"));
    }

    Ok(CliCommand::Chat {
        session_id,
        model,
        message: words.join(" "),
    })
}

fn no_more<I>(mut args: I) -> Result<(), ArgsError>
where
    I: Iterator<Item = String>,
{
    match args.next() {
        Some(extra) => Err(ArgsError::Unexpected(extra)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, ArgsError> {
        let mut all = vec!["monitor-assist".to_string()];
        all.extend(args.iter().map(|s| s.to_string()));
        parse_args(all.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-V"]), Ok(CliCommand::Version));
    }

    #[test]
    fn test_no_args_shows_help() {
        assert_eq!(parse(&[]), Ok(CliCommand::Help));
        assert_eq!(parse(&["-h"]), Ok(CliCommand::Help));
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(
            parse(&["chat", "--session", "s1", "why", "is", "disk", "full"]),
            Ok(CliCommand::Chat {
                session_id: "s1".to_string(),
                model: None,
                message: "why is disk full".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_chat_with_model_after_message() {
        assert_eq!(
            parse(&["chat", "hello", "-m", "qwen", "-s", "s2"]),
            Ok(CliCommand::Chat {
                session_id: "s2".to_string(),
                model: Some("qwen".to_string()),
                message: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_chat_double_dash() {
        assert_eq!(
            parse(&["chat", "-s", "s1", "--", "--not-a-flag"]),
            Ok(CliCommand::Chat {
                session_id: "s1".to_string(),
                model: None,
                message: "--not-a-flag".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_chat_errors() {
        assert_eq!(parse(&["chat", "hi"]), Err(ArgsError::Missing("--session <id>")));
        assert_eq!(parse(&["chat", "-s", "s1"]), Err(ArgsError::Missing("message")));
        assert_eq!(
            parse(&["chat", "--session"]),
            Err(ArgsError::MissingValue("--session".to_string()))
        );
        assert_eq!(
            parse(&["chat", "--verbose"]),
            Err(ArgsError::UnknownOption("--verbose".to_string()))
        );
    }

    #[test]
    fn test_parse_assist_and_bind() {
        assert_eq!(
            parse(&["assist", "ai-1"]),
            Ok(CliCommand::Assist {
                session_id: "ai-1".to_string()
            })
        );
        assert_eq!(
            parse(&["bind", "ssh-1", "agent-1"]),
            Ok(CliCommand::Bind {
                ssh_session_id: "ssh-1".to_string(),
                agent_id: "agent-1".to_string(),
            })
        );
        assert_eq!(parse(&["bind", "ssh-1"]), Err(ArgsError::Missing("agent id")));
        assert_eq!(
            parse(&["assist", "a", "b"]),
            Err(ArgsError::Unexpected("b".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse(&["status"]),
            Err(ArgsError::UnknownCommand("status".to_string()))
        );
        assert_eq!(
            parse(&["--sync"]),
            Err(ArgsError::UnknownOption("--sync".to_string()))
        );
    }
}
