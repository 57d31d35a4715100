//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the
// file, specified in the pathname, to the server- or user-DTP
// at the other end of the data connection.  The status and
// contents of the file at the server site shall be unaffected.

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
pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Retr
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
        let reader = match storage::resolve(&session.cwd, &self.path) {
            Ok(path) => storage.get(path).await,
            Err(err) => Err(err),
        };

        match reader {
            Ok(reader) => {
                let transfer = Transfer::Retr {
                    path: self.path.clone(),
                    reader,
                };
                Ok(start_transfer(&mut session, conn, transfer, &args))
            }
            Err(err) => {
                slog::warn!(args.logger, "Could not retrieve {:?}: {}", self.path, err);
                Ok(storage_failure(conn, &err))
            }
        }
    }
}
