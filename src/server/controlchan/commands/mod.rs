//! This module contains the implementations for the FTP commands defined in
//!
//! - [RFC 959 - FTP](https://tools.ietf.org/html/rfc959)

mod cwd;
mod help;
mod list;
mod noop;
mod other;
mod pass;
mod port;
mod pwd;
mod quit;
mod retr;
mod syst;
mod type_;
mod user;

pub use cwd::Cwd;
pub use help::Help;
pub use list::List;
pub use noop::Noop;
pub use other::Other;
pub use pass::Pass;
pub use port::Port;
pub use pwd::Pwd;
pub use quit::Quit;
pub use retr::Retr;
pub use syst::Syst;
pub use type_::Type;
pub use user::User;

use crate::{
    server::{
        controlchan::{Reply, ReplyCode, handler::CommandContext},
        datachan::{self, Transfer, active::PendingDataConnection},
        session::Session,
    },
    storage::{self, StorageBackend},
};

fn no_data_connection() -> Reply {
    Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")
}

// The storage query for a LIST or RETR failed. The data connection was taken for this command so
// it's closed here and the client has to send a new PORT.
fn storage_failure(conn: PendingDataConnection, err: &storage::Error) -> Reply {
    drop(conn);
    let reason = match err.kind() {
        storage::ErrorKind::PermanentFileNotAvailable => "file not found",
        storage::ErrorKind::PermissionDenied => "permission denied",
        storage::ErrorKind::FileNameNotAllowedError => "file name not allowed",
        storage::ErrorKind::LocalError => "local error",
    };
    Reply::new_with_string(ReplyCode::CantOpenDataConnection, format!("Can't open data connection: {}", reason))
}

// Hands the data connection to a transfer task and tells the client the data is coming. The
// final 226 or 426 is sent by the control loop once the task reports back.
fn start_transfer<Storage>(session: &mut Session<Storage>, conn: PendingDataConnection, transfer: Transfer, args: &CommandContext<Storage>) -> Reply
where
    Storage: StorageBackend + 'static,
{
    let logger = args.logger.new(slog::o!("data-endpoint" => conn.endpoint.to_string()));
    slog::info!(logger, "Starting data transfer {:?}", transfer);
    let handle = datachan::spawn_transfer(logger, conn.stream, transfer, args.transfer_chunk_size, args.tx_control_chan.clone());
    session.data_transfer = Some(handle);
    Reply::from_code(ReplyCode::FileStatusOkay)
}
