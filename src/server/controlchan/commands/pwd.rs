//! The RFC 959 Print Working Directory (`PWD`) command
//
// This command causes the name of the current working
// directory to be returned in the reply.

use crate::{
    server::controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pwd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pwd
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        // Embedded double quotes are doubled, as RFC 959 prescribes for 257 replies.
        let cwd = session.cwd.to_string_lossy().replace('"', "\"\"");
        Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{}\" is the current directory", cwd)))
    }
}
