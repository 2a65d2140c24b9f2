//! Parses prompt lines into engine commands and feeds them to the engine.

use std::io::Write;

use meridian_session::{CommandKind, SessionHandle};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::terminal::TerminalPresenter;

/// Why a prompt line was not a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Nothing but whitespace.
    #[error("empty input")]
    Empty,

    /// `0` was entered; choices are numbered from one.
    #[error("choices are numbered from 1")]
    ZeroChoice,

    /// `load` without a code.
    #[error("usage: load <code>")]
    MissingCode,

    /// Anything else.
    #[error("unrecognized input: {0}")]
    Unrecognized(String),
}

/// Maps one prompt line to a command.
///
/// # Errors
///
/// Returns an [`InputError`] describing why the line is not a command.
pub fn parse_command(line: &str) -> Result<CommandKind, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }

    if let Ok(number) = line.parse::<usize>() {
        let index = number.checked_sub(1).ok_or(InputError::ZeroChoice)?;
        return Ok(CommandKind::SelectChoice { index });
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));
    match (word.to_ascii_lowercase().as_str(), rest) {
        ("r" | "rewind", "") => Ok(CommandKind::Rewind),
        ("f" | "fast", "") => Ok(CommandKind::ToggleFastMode),
        ("s" | "save", "") => Ok(CommandKind::RequestSaveCode),
        ("restart", "") => Ok(CommandKind::Restart),
        ("q" | "quit" | "exit", "") => Ok(CommandKind::Shutdown),
        ("load", "") => Err(InputError::MissingCode),
        ("load", code) => Ok(CommandKind::LoadSaveCode {
            code: code.to_owned(),
        }),
        _ => Err(InputError::Unrecognized(line.to_owned())),
    }
}

/// Reads lines from `reader` and sends each command through `handle`.
///
/// Returns after a quit command, at end of input, or once the engine stops
/// accepting commands. Rejected lines are reported through `presenter`.
///
/// # Errors
///
/// Returns `AppError::Io` if reading fails.
pub async fn pump<R, W>(
    reader: R,
    handle: &SessionHandle,
    presenter: &TerminalPresenter<W>,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let kind = match parse_command(&line) {
            Ok(kind) => kind,
            Err(InputError::Empty) => continue,
            Err(err) => {
                warn!(input = %line.trim(), error = %err, "rejected input");
                presenter.hint(&err.to_string());
                continue;
            }
        };

        let quit = kind == CommandKind::Shutdown;
        match handle.send(kind).await {
            Ok(correlation_id) => debug!(%correlation_id, "command queued"),
            Err(err) => {
                debug!(error = %err, "engine stopped accepting commands");
                break;
            }
        }
        if quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_select_zero_based_choices() {
        assert_eq!(
            parse_command("1"),
            Ok(CommandKind::SelectChoice { index: 0 })
        );
        assert_eq!(
            parse_command(" 3 "),
            Ok(CommandKind::SelectChoice { index: 2 })
        );
    }

    #[test]
    fn test_zero_is_not_a_choice() {
        assert_eq!(parse_command("0"), Err(InputError::ZeroChoice));
    }

    #[test]
    fn test_single_letter_shortcuts() {
        assert_eq!(parse_command("r"), Ok(CommandKind::Rewind));
        assert_eq!(parse_command("F"), Ok(CommandKind::ToggleFastMode));
        assert_eq!(parse_command("s"), Ok(CommandKind::RequestSaveCode));
        assert_eq!(parse_command("q"), Ok(CommandKind::Shutdown));
        assert_eq!(parse_command("restart"), Ok(CommandKind::Restart));
    }

    #[test]
    fn test_load_keeps_the_code_as_typed() {
        assert_eq!(
            parse_command("load 1008-0000 7435"),
            Ok(CommandKind::LoadSaveCode {
                code: "1008-0000 7435".to_owned()
            })
        );
    }

    #[test]
    fn test_load_without_code_is_rejected() {
        assert_eq!(parse_command("load   "), Err(InputError::MissingCode));
    }

    #[test]
    fn test_blank_and_unknown_lines_are_rejected() {
        assert_eq!(parse_command("   "), Err(InputError::Empty));
        assert_eq!(
            parse_command("dance"),
            Err(InputError::Unrecognized("dance".to_owned()))
        );
        assert_eq!(
            parse_command("r now"),
            Err(InputError::Unrecognized("r now".to_owned()))
        );
    }
}
