//! Contains the [`StorageBackend`] trait that is used by the [`Server`](crate::Server) to list
//! and retrieve files, together with a local-disk implementation.

mod error;
pub use error::{Error, ErrorKind};

pub(crate) mod storage_backend;
pub use storage_backend::{Fileinfo, Metadata, Permissions, Result, StorageBackend};

mod cap_fs;
pub mod filesystem;
pub use filesystem::Filesystem;

mod vpath;
pub use vpath::resolve;
