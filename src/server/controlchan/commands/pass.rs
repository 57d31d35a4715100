//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's
// password.  This command must be immediately preceded by the
// user name command, and, for some sites, completes the user's
// identification for access control.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        session::SessionState,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

// Any password is accepted.
#[derive(Debug)]
pub struct Pass;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pass
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::WaitPass => {
                session.state = SessionState::WaitCmd;
                slog::info!(args.logger, "User logged in"; "username" => session.username.as_deref().unwrap_or_default());
                Ok(Reply::from_code(ReplyCode::UserLoggedIn))
            }
            SessionState::New => Ok(Reply::new(ReplyCode::BadCommandSequence, "Please supply a username first")),
            SessionState::WaitCmd => Ok(Reply::new(ReplyCode::BadCommandSequence, "Already logged in")),
        }
    }
}
