//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user.
// The user identification is that which is required by the
// server for access to its file system.  This command will
// normally be the first command transmitted by the user after
// the control connections are made.

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
use bytes::Bytes;

#[derive(Debug)]
pub struct User {
    username: Bytes,
}

impl User {
    pub fn new(username: Bytes) -> Self {
        User { username }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for User
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        match session.state {
            SessionState::New | SessionState::WaitPass => {
                let username = String::from_utf8_lossy(&self.username).to_string();
                slog::info!(args.logger, "User {} announced", username);
                session.username = Some(username);
                session.state = SessionState::WaitPass;
                Ok(Reply::from_code(ReplyCode::NeedPassword))
            }
            SessionState::WaitCmd => Ok(Reply::new(ReplyCode::BadCommandSequence, "Please create a new connection to switch user")),
        }
    }
}
