//! Contains the [`Server`](crate::Server) and everything it needs to serve FTP sessions: the
//! control channel loop, the active mode data channel and per-session state.

mod chancomms;
mod controlchan;
mod datachan;
pub(crate) mod ftpserver;
mod session;
pub(crate) mod shutdown;
