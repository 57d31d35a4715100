//! The RFC 959 Help (`HELP`) command
//
// This command shall cause the server to send helpful
// information regarding its implementation status over the
// control connection to the user.  The command may take an
// argument (e.g., any command name) and return more specific
// information as a response.  The reply is type 211 or 214.
// It is suggested that HELP be allowed before entering a USER
// command. The server may use this reply to specify
// site-dependent parameters, e.g., in response to HELP SITE.

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
pub struct Help;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Help
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let text = vec![
            ReplyCode::HelpMessage.text(),
            "USER PASS PWD CWD PORT LIST RETR",
            "QUIT HELP NOOP SYST TYPE",
            "End of help.",
        ];
        Ok(Reply::new_multiline(ReplyCode::HelpMessage, text))
    }
}
