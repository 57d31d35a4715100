use bytes::Bytes;
use std::fmt;

/// A command sent by the client over the control channel, produced by the line parser.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    User {
        /// The bytes making up the actual username.
        username: Bytes,
    },
    /// The password itself is dropped by the parser and never ends up in a log line.
    Pass,
    Pwd,
    Cwd {
        /// The path the client would like to change directory to, as given.
        path: String,
    },
    Port {
        /// The `h1,h2,h3,h4,p1,p2` host-port specification, not yet decoded.
        addr: String,
    },
    List {
        /// Options passed along with the list command, e.g. `-la`. These are ignored.
        options: Option<String>,
        /// The path of the file/directory the clients wants to list
        path: Option<String>,
    },
    Retr {
        /// The path to the file the client would like to retrieve.
        path: String,
    },
    Quit,
    Help,
    Noop,
    Syst,
    Type,
    Other {
        command_name: String,
        arguments: String,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
