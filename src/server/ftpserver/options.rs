//! Contains the defaults of the options that can be given to the [`ServerBuilder`](crate::ServerBuilder)

use std::time::Duration;

pub use crate::server::shutdown::DEFAULT_GRACE_PERIOD;

/// No greeting is sent on connect unless one is configured.
pub const DEFAULT_GREETING: Option<&str> = None;

/// Clients don't have to log in before using other commands.
pub const DEFAULT_REQUIRE_LOGIN: bool = false;

/// How long connecting to the endpoint given with `PORT` may take.
pub const DEFAULT_ACTIVE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The number of bytes read from storage and written to the data connection at a time.
pub const DEFAULT_TRANSFER_CHUNK_SIZE: usize = 8 * 1024;
