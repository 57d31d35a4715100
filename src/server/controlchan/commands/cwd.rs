//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different
// directory or dataset for file storage or retrieval without
// altering his login or accounting information.  Transfer
// parameters are similarly unchanged.  The argument is a
// pathname specifying a directory or other system dependent
// file group designator.

use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::{self, StorageBackend},
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug)]
pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Cwd
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let storage: Arc<Storage> = Arc::clone(&session.storage);
        let logger = args.logger;

        let path = match storage::resolve(&session.cwd, &self.path) {
            Ok(path) => path,
            Err(err) => {
                slog::warn!(logger, "Refusing to cwd to {:?}: {}", self.path, err);
                return Ok(Reply::from_code(ReplyCode::FileError));
            }
        };

        match storage.cwd(&path).await {
            Ok(()) => {
                slog::debug!(logger, "Changed working directory to {:?}", path);
                session.cwd = path;
                Ok(Reply::from_code(ReplyCode::FileActionOkay))
            }
            Err(err) => {
                slog::warn!(logger, "Failed to cwd directory {:?}: {}", path, err);
                Ok(Reply::from_code(ReplyCode::FileError))
            }
        }
    }
}
