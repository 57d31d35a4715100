//! Contains code pertaining to the communication between the data and control channels.

use std::fmt;

/// Messages that can be sent to the control channel loop.
#[derive(Debug)]
pub enum ControlChanMsg {
    /// Data was successfully sent to the client during a RETR
    SentData {
        /// The path as specified by the client
        path: String,
        /// The number of bytes transferred
        bytes: u64,
    },
    /// Listed the directory successfully
    DirectorySuccessfullyListed {
        /// The number of bytes transferred
        bytes: u64,
    },
    /// Writing to the data connection failed halfway through the transfer
    ConnectionReset,
    /// Reading the file from storage failed halfway through the transfer
    ReadFailed,
    /// Quit the client connection
    ExitControlLoop,
}

impl fmt::Display for ControlChanMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
