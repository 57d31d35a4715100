//! Contains the `Reply` type that is sent back to clients over the control channel and the
//! catalog of reply codes with their canonical RFC 959 texts.

/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    None,
    CodeAndMsg { code: ReplyCode, msg: String },
    MultiLine { code: ReplyCode, lines: Vec<String> },
}

/// The reply codes according to RFC 959.
//
// From: https://cr.yp.to/ftp/request.html#response
//
// The three digits form a code. Codes between 100 and 199 indicate marks; codes between 200
// and 399 indicate acceptance; codes between 400 and 599 indicate rejection.
//
// RFC 959 prohibited all codes other than 110, 120, 125, 150, 200, 202, 211, 212, 213, 214, 215,
// 220, 221, 225, 226, 227, 230, 250, 257, 331, 332, 350, 421, 425, 426, 450, 451, 452, 500, 501,
// 502, 503, 504, 530, 532, 550, 551, 552, and 553.
//
// Typically the second digit is:
// - 0 for a syntax error
// - 1 for a human-oriented help message,
// - 2 for a hello/goodbye message
// - 3 for an accounting message
// - 5 for a filesystem-related message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ReplyCode {
    FileStatusOkay = 150,

    #[default]
    CommandOkay = 200,
    HelpMessage = 214,
    SystemType = 215,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    ClosingDataConnection = 226,
    UserLoggedIn = 230,
    FileActionOkay = 250,
    DirCreated = 257,

    NeedPassword = 331,

    ServiceNotAvailable = 421,
    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    LocalError = 451,

    CommandSyntaxError = 500,
    ParameterSyntaxError = 501,
    BadCommandSequence = 503,
    NotLoggedIn = 530,
    FileError = 550,
}

impl ReplyCode {
    /// The canonical text for this code.
    pub fn text(self) -> &'static str {
        use ReplyCode::*;
        match self {
            FileStatusOkay => "File status okay; about to open data connection.",
            CommandOkay => "Command okay.",
            HelpMessage => "Help message.",
            SystemType => "UNIX Type: L8",
            ServiceReady => "Service ready for new user.",
            ClosingControlConnection => "Service closing control connection.",
            ClosingDataConnection => "Closing data connection.",
            UserLoggedIn => "User logged in, proceed.",
            FileActionOkay => "Requested file action okay, completed.",
            DirCreated => "\"PATHNAME\" created.",
            NeedPassword => "User name okay, need password.",
            ServiceNotAvailable => "Service not available, closing control connection.",
            CantOpenDataConnection => "Can't open data connection.",
            ConnectionClosed => "Connection closed; transfer aborted.",
            LocalError => "Requested action aborted: local error in processing.",
            CommandSyntaxError => "Syntax error, command unrecognized.",
            ParameterSyntaxError => "Syntax error in parameters or arguments.",
            BadCommandSequence => "Bad sequence of commands.",
            NotLoggedIn => "Not logged in.",
            FileError => "Requested action not taken. File unavailable.",
        }
    }
}

impl Reply {
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| format!("{}", item)).collect(),
        }
    }

    // A reply with the catalog text for `code`.
    pub fn from_code(code: ReplyCode) -> Self {
        Reply::new(code, code.text())
    }

    // A no-reply
    pub fn none() -> Self {
        Reply::None
    }

    pub fn code(&self) -> Option<ReplyCode> {
        match self {
            Reply::None => None,
            Reply::CodeAndMsg { code, .. } | Reply::MultiLine { code, .. } => Some(*code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_texts() {
        assert_eq!(ReplyCode::CommandOkay.text(), "Command okay.");
        assert_eq!(ReplyCode::HelpMessage.text(), "Help message.");
        assert_eq!(ReplyCode::NotLoggedIn.text(), "Not logged in.");
    }

    #[test]
    fn numeric_values() {
        assert_eq!(ReplyCode::FileStatusOkay as u32, 150);
        assert_eq!(ReplyCode::CantOpenDataConnection as u32, 425);
        assert_eq!(ReplyCode::NotLoggedIn as u32, 530);
    }

    #[test]
    fn default_is_command_okay() {
        assert_eq!(ReplyCode::default(), ReplyCode::CommandOkay);
        assert_eq!(Reply::from_code(ReplyCode::default()), Reply::new(ReplyCode::CommandOkay, "Command okay."));
    }

    #[test]
    fn code_of_a_reply() {
        assert_eq!(Reply::from_code(ReplyCode::FileError).code(), Some(ReplyCode::FileError));
        assert_eq!(Reply::new_multiline(ReplyCode::HelpMessage, vec!["a", "b"]).code(), Some(ReplyCode::HelpMessage));
        assert_eq!(Reply::none().code(), None);
    }
}
