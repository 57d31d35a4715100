//! The RFC 959 Data Port (`PORT`) command
//
// The argument is a HOST-PORT specification for the data port
// to be used in data connection.  There are defaults for both
// the user and server data ports, and under normal
// circumstances this command and its reply are not needed.  If
// this command is used, the argument is the concatenation of a
// 32-bit internet host address and a 16-bit TCP port address.
// This address information is broken into 8-bit fields and the
// value of each field is transmitted as a decimal number (in
// character string representation).  The fields are separated
// by commas.  A port command would be:
//
// PORT h1,h2,h3,h4,p1,p2
//
// where h1 is the high order 8 bits of the internet host
// address.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        datachan::active::{self, DataConnectionRequest},
        session::SharedSession,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Port {
    addr: String,
}

impl Port {
    pub fn new(addr: String) -> Self {
        Port { addr }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Port
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError> {
        let logger = args.logger;
        let request: DataConnectionRequest = match self.addr.parse() {
            Ok(request) => request,
            Err(err) => {
                slog::warn!(logger, "Invalid PORT argument {:?}: {}", self.addr, err);
                discard_pending(&args.session, &logger).await;
                return Ok(Reply::from_code(ReplyCode::ParameterSyntaxError));
            }
        };

        // The connection is made right away so that an unreachable client hears about it now
        // rather than at the next LIST or RETR.
        match active::connect(request, args.active_connect_timeout).await {
            Ok(conn) => {
                slog::info!(logger, "Opened active data connection to {}", conn.endpoint);
                let mut session = args.session.lock().await;
                if let Some(previous) = session.set_data_conn(conn) {
                    slog::info!(logger, "Closing unused data connection to {}", previous.endpoint);
                }
                Ok(Reply::from_code(ReplyCode::CommandOkay))
            }
            Err(err) => {
                slog::warn!(logger, "Could not open active data connection to {}: {}", request.endpoint(), err);
                discard_pending(&args.session, &logger).await;
                Ok(Reply::from_code(ReplyCode::CantOpenDataConnection))
            }
        }
    }
}

// A PORT that fails still replaces the earlier target, so nothing goes to an endpoint the client
// has moved away from.
async fn discard_pending<Storage>(session: &SharedSession<Storage>, logger: &slog::Logger)
where
    Storage: StorageBackend + 'static,
{
    if let Some(previous) = session.lock().await.take_data_conn() {
        slog::info!(logger, "Closing data connection to {} replaced by a failed PORT", previous.endpoint);
    }
}
