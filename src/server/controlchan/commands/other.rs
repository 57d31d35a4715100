//! Catches every verb this server doesn't know about.

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
pub struct Other {
    command_name: String,
    arguments: String,
}

impl Other {
    pub fn new(command_name: String, arguments: String) -> Self {
        Other { command_name, arguments }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Other
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        slog::info!(args.logger, "Unrecognized command {:?}", self.command_name; "arguments" => &self.arguments);
        Ok(Reply::from_code(ReplyCode::CommandSyntaxError))
    }
}
