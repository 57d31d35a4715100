#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
//! activeftp is an async FTP server library that serves files from a storage back-end over
//! active-mode (`PORT`) data connections.
//!
//! A server is configured through a [`ServerBuilder`] and started with [`Server::listen`]:
//!
//! ```no_run
//! use activeftp::Server;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let ftp_home = std::env::temp_dir();
//!     let server = Server::with_fs(ftp_home)
//!         .greeting("Welcome to my FTP server")
//!         .build()
//!         .unwrap();
//!
//!     server.listen("127.0.0.1:2121").await.unwrap();
//! }
//! ```
//!
//! Every control connection gets its own session. A client announces where it listens with
//! `PORT h1,h2,h3,h4,p1,p2`, the server connects to that endpoint straight away and uses the
//! connection for the next `LIST` or `RETR`.

pub(crate) mod server;
pub mod storage;

pub use crate::server::ftpserver::{
    Server, ServerBuilder,
    error::{ServerError, ServerErrorKind},
    options,
};
pub use crate::server::shutdown::Shutdown;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
