//! The RFC 959 No Operation (`NOOP`) command
//
// This command does not affect any parameters or previously
// entered commands. It specifies no action other than that the
// server send an OK reply.

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
pub struct Noop;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Noop
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        Ok(Reply::from_code(ReplyCode::CommandOkay))
    }
}
