use crate::{
    server::{
        controlchan::{Reply, ReplyCode, command::Command, error::ControlChanError, event::Event, middleware::ControlChanMiddleware},
        session::{SessionState, SharedSession},
    },
    storage::StorageBackend,
};

use async_trait::async_trait;

// AuthMiddleware ensures the user is logged in before they can do much else. It only
// intervenes when the server was built with `require_login(true)`.
pub struct AuthMiddleware<Storage, Next>
where
    Storage: StorageBackend + 'static,
    Next: ControlChanMiddleware,
{
    pub session: SharedSession<Storage>,
    pub login_required: bool,
    pub next: Next,
}

#[async_trait]
impl<Storage, Next> ControlChanMiddleware for AuthMiddleware<Storage, Next>
where
    Storage: StorageBackend + 'static,
    Next: ControlChanMiddleware,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        if !self.login_required {
            return self.next.handle(event).await;
        }
        match event {
            // internal messages and the below commands are exempt from auth checks.
            Event::InternalMsg(_)
            | Event::Command(Command::Help)
            | Event::Command(Command::User { .. })
            | Event::Command(Command::Pass)
            | Event::Command(Command::Quit) => self.next.handle(event).await,
            _ => {
                let session_state = self.session.lock().await.state;
                if session_state != SessionState::WaitCmd {
                    Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate"))
                } else {
                    self.next.handle(event).await
                }
            }
        }
    }
}
