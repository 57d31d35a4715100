use super::error::{ParseErrorKind, Result};
use crate::server::controlchan::command::Command;

use bytes::Bytes;
use std::str;

/// Parse the given bytes into a [`Command`].
///
/// The line must end in `\r\n` or a bare `\n`. The verb is matched case-insensitively and is
/// separated from its argument by a run of spaces or tabs; whitespace inside the argument is
/// kept as-is. Verbs we don't know become [`Command::Other`] rather than an error.
///
/// [`Command`]: ./enum.Command.html
pub fn parse<T>(line: T) -> Result<Command>
where
    T: AsRef<[u8]> + Into<Bytes>,
{
    let bytes: Bytes = line.into();
    let line = str::from_utf8(strip_eol(&bytes)?)?;
    let (cmd_token, cmd_params) = match line.find(is_blank) {
        Some(idx) => (&line[..idx], line[idx..].trim_start_matches(is_blank)),
        None => (line, ""),
    };
    let cmd_token = normalize(cmd_token);

    let cmd = match &*cmd_token {
        "USER" => Command::User {
            username: Bytes::copy_from_slice(cmd_params.as_bytes()),
        },
        // Any password is accepted, so it isn't kept.
        "PASS" => Command::Pass,
        "PWD" | "XPWD" => {
            no_params(cmd_params)?;
            Command::Pwd
        }
        "CWD" | "XCWD" => Command::Cwd {
            path: required_param(cmd_params)?,
        },
        "PORT" => Command::Port {
            addr: required_param(cmd_params)?,
        },
        "LIST" => {
            let (options, paths): (Vec<&str>, Vec<&str>) = cmd_params.split(is_blank).filter(|s| !s.is_empty()).partition(|s| s.starts_with('-'));
            Command::List {
                options: if options.is_empty() { None } else { Some(options.join(" ")) },
                path: paths.first().map(|s| s.to_string()),
            }
        }
        "RETR" => Command::Retr {
            path: required_param(cmd_params)?,
        },
        "QUIT" => {
            no_params(cmd_params)?;
            Command::Quit
        }
        "HELP" => Command::Help,
        "NOOP" => {
            no_params(cmd_params)?;
            Command::Noop
        }
        "SYST" => {
            no_params(cmd_params)?;
            Command::Syst
        }
        "TYPE" => {
            // We don't do text format conversion, we're always in binary mode.
            Command::Type
        }
        _ => Command::Other {
            command_name: cmd_token,
            arguments: cmd_params.to_string(),
        },
    };

    Ok(cmd)
}

// Strips the line terminator. Clients should send CRLF but not all of them include the '\r'. A
// lone '\r' anywhere else is invalid.
fn strip_eol(line: &[u8]) -> Result<&[u8]> {
    let content = match line {
        [rest @ .., b'\r', b'\n'] => rest,
        [rest @ .., b'\n'] => rest,
        _ => return Err(ParseErrorKind::InvalidEol.into()),
    };
    if content.contains(&b'\r') {
        return Err(ParseErrorKind::InvalidEol.into());
    }
    Ok(content)
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn no_params(params: &str) -> Result<()> {
    if params.is_empty() { Ok(()) } else { Err(ParseErrorKind::InvalidCommand.into()) }
}

fn required_param(params: &str) -> Result<String> {
    if params.is_empty() {
        return Err(ParseErrorKind::InvalidCommand.into());
    }
    Ok(params.to_string())
}

fn normalize(token: &str) -> String {
    token.to_uppercase()
}
