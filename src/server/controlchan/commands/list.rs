//! The RFC 959 List (`LIST`) command
//
// This command causes a list to be sent from the server to the
// passive DTP.  If the pathname specifies a directory or other
// group of files, the server should transfer a list of files
// in the specified directory.  If the pathname specifies a
// file then the server should send current information on the
// file.  A null argument implies the user's current working or
// default directory.  The data transfer is over the data
// connection in type ASCII or type EBCDIC.  (The user must
// ensure that the TYPE is appropriately ASCII or EBCDIC).
// Since the information on a file may vary widely from system
// to system, this information may be hard to use automatically
// in a program, but may be quite useful to a human user.

use super::{no_data_connection, start_transfer, storage_failure};
use crate::{
    server::{
        controlchan::{
            Reply,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        datachan::Transfer,
    },
    storage::{self, StorageBackend},
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct List {
    path: Option<String>,
}

impl List {
    pub fn new(path: Option<String>) -> Self {
        List { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for List
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let Some(conn) = session.take_data_conn() else {
            return Ok(no_data_connection());
        };

        let storage: Arc<Storage> = Arc::clone(&session.storage);
        let listing = match storage::resolve(&session.cwd, self.path.as_deref().unwrap_or_default()) {
            Ok(path) => storage.list_fmt(path).await,
            Err(err) => Err(err),
        };

        match listing {
            Ok(listing) => Ok(start_transfer(&mut session, conn, Transfer::List { listing }, &args)),
            Err(err) => {
                slog::warn!(args.logger, "Could not list {:?}: {}", self.path, err);
                Ok(storage_failure(conn, &err))
            }
        }
    }
}
