use crate::{
    server::{
        chancomms::ControlChanMsg,
        controlchan::{
            Reply, ReplyCode,
            auth::AuthMiddleware,
            codecs::FtpCodec,
            command::Command,
            commands,
            error::{ControlChanError, ControlChanErrorKind},
            event::Event,
            handler::{CommandContext, CommandHandler},
            log::LoggingMiddleware,
            middleware::ControlChanMiddleware,
        },
        session::{Session, SharedSession},
        shutdown,
    },
    storage::StorageBackend,
};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::{sync::Arc, time::Duration};
use tokio::{
    net::TcpStream,
    sync::{
        Mutex,
        mpsc::{Receiver, Sender, channel},
    },
};
use tokio_util::codec::{Decoder, Framed};

// Room for the outcome of a data transfer plus the exit request of a QUIT.
const CONTROL_MSG_BUFFER: usize = 8;

#[derive(Debug)]
pub struct LoopConfig<Storage>
where
    Storage: StorageBackend,
{
    pub storage: Storage,
    pub greeting: Option<&'static str>,
    pub require_login: bool,
    pub active_connect_timeout: Duration,
    pub transfer_chunk_size: usize,
    pub logger: slog::Logger,
}

/// Does TCP processing when a FTP client connects
#[tracing_attributes::instrument]
pub(crate) async fn spawn_loop<Storage>(config: LoopConfig<Storage>, tcp_stream: TcpStream, mut shutdown: shutdown::Listener) -> Result<(), ControlChanError>
where
    Storage: StorageBackend + 'static,
{
    let LoopConfig {
        storage,
        greeting,
        require_login,
        active_connect_timeout,
        transfer_chunk_size,
        logger,
    } = config;

    let source = tcp_stream.peer_addr()?;
    let (control_msg_tx, mut control_msg_rx): (Sender<ControlChanMsg>, Receiver<ControlChanMsg>) = channel(CONTROL_MSG_BUFFER);
    let session: Session<Storage> = Session::new(Arc::new(storage), source);

    let logger = logger.new(slog::o!("trace-id" => format!("{}", session.trace_id), "source" => format!("{}", session.source)));

    let shared_session: SharedSession<Storage> = Arc::new(Mutex::new(session));

    let event_chain = PrimaryEventHandler {
        logger: logger.clone(),
        session: shared_session.clone(),
        tx_control_chan: control_msg_tx,
        active_connect_timeout,
        transfer_chunk_size,
    };

    let event_chain = AuthMiddleware {
        session: shared_session.clone(),
        login_required: require_login,
        next: event_chain,
    };

    let mut event_chain = LoggingMiddleware {
        logger: logger.clone(),
        sequence_nr: 0,
        next: event_chain,
    };

    let codec = FtpCodec::new();
    let cmd_and_reply_stream: Framed<TcpStream, FtpCodec> = codec.framed(tcp_stream);
    let (mut reply_sink, mut command_source) = cmd_and_reply_stream.split();

    if let Some(greeting) = greeting {
        reply_sink.send(Reply::new(ReplyCode::ServiceReady, greeting)).await?;
    }

    tokio::spawn(async move {
        // The control channel event loop
        slog::info!(logger, "Starting control loop");
        loop {
            // Commands stay unread while a transfer runs so that its final reply comes before
            // the reply to anything the client sends next.
            let transfer_in_progress = shared_session.lock().await.transfer_in_progress();

            let incoming = tokio::select! {
                biased;

                Some(msg) = control_msg_rx.recv() => {
                    Some(Ok(Event::InternalMsg(msg)))
                },
                _ = shutdown.listen() => {
                    slog::info!(logger, "Shutting down control loop");
                    if let Err(err) = reply_sink.send(Reply::from_code(ReplyCode::ServiceNotAvailable)).await {
                        slog::warn!(logger, "Could not send shutdown notice to client: {}", err);
                    }
                    break;
                },
                cmd_result = command_source.next(), if !transfer_in_progress => {
                    cmd_result.map(|line| line.and_then(|command| command.map(Event::Command)))
                },
            };

            match incoming {
                None => {
                    slog::info!(logger, "Client closed the control connection");
                    break;
                }
                Some(Ok(Event::InternalMsg(ControlChanMsg::ExitControlLoop))) => {
                    slog::info!(logger, "Exit requested, closing control connection");
                    break;
                }
                Some(Ok(event)) => {
                    let reply = match event_chain.handle(event).await {
                        Ok(reply) => reply,
                        Err(err) => handle_control_channel_error(&logger, err),
                    };
                    if let Err(err) = reply_sink.send(reply).await {
                        slog::warn!(logger, "Could not send reply to client: {}", err);
                        break;
                    }
                }
                Some(Err(err)) if *err.kind() == ControlChanErrorKind::IoError => {
                    slog::warn!(logger, "Control connection failed: {}", err);
                    break;
                }
                Some(Err(err)) => {
                    let reply = handle_control_channel_error(&logger, err);
                    if let Err(err) = reply_sink.send(reply).await {
                        slog::warn!(logger, "Could not send error reply to client: {}", err);
                        break;
                    }
                }
            }
        }

        shared_session.lock().await.close_data_connections();
        slog::info!(logger, "Control loop ended");
        // Dropping the shutdown listener here lets the server know this session is done.
        drop(shutdown);
    });

    Ok(())
}

// The last link in the control channel middleware chain. It dispatches commands to their
// handlers and turns data channel outcomes into replies.
#[derive(Debug)]
struct PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    logger: slog::Logger,
    session: SharedSession<Storage>,
    tx_control_chan: Sender<ControlChanMsg>,
    active_connect_timeout: Duration,
    transfer_chunk_size: usize,
}

impl<Storage> PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle_command(&self, cmd: Command) -> Result<Reply, ControlChanError> {
        let args = CommandContext {
            session: self.session.clone(),
            tx_control_chan: self.tx_control_chan.clone(),
            active_connect_timeout: self.active_connect_timeout,
            transfer_chunk_size: self.transfer_chunk_size,
            logger: self.logger.clone(),
        };

        let handler: Box<dyn CommandHandler<Storage>> = match cmd {
            Command::User { username } => Box::new(commands::User::new(username)),
            Command::Pass => Box::new(commands::Pass),
            Command::Pwd => Box::new(commands::Pwd),
            Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
            Command::Port { addr } => Box::new(commands::Port::new(addr)),
            Command::List { options, path } => {
                if let Some(options) = options {
                    slog::debug!(self.logger, "Ignoring LIST options {:?}", options);
                }
                Box::new(commands::List::new(path))
            }
            Command::Retr { path } => Box::new(commands::Retr::new(path)),
            Command::Quit => Box::new(commands::Quit),
            Command::Help => Box::new(commands::Help),
            Command::Noop => Box::new(commands::Noop),
            Command::Syst => Box::new(commands::Syst),
            Command::Type => Box::new(commands::Type),
            Command::Other { command_name, arguments } => Box::new(commands::Other::new(command_name, arguments)),
        };

        handler.handle(args).await
    }

    #[tracing_attributes::instrument]
    async fn handle_internal_msg(&self, msg: ControlChanMsg) -> Result<Reply, ControlChanError> {
        use ControlChanMsg::*;

        // Every message but the exit request reports the end of the running transfer.
        if !matches!(msg, ExitControlLoop) {
            self.session.lock().await.data_transfer = None;
        }

        match msg {
            SentData { path, bytes } => {
                slog::info!(self.logger, "Sent file"; "path" => path, "bytes" => bytes);
                Ok(Reply::from_code(ReplyCode::ClosingDataConnection))
            }
            DirectorySuccessfullyListed { bytes } => {
                slog::info!(self.logger, "Listed directory"; "bytes" => bytes);
                Ok(Reply::from_code(ReplyCode::ClosingDataConnection))
            }
            ConnectionReset => Ok(Reply::from_code(ReplyCode::ConnectionClosed)),
            ReadFailed => Ok(Reply::from_code(ReplyCode::LocalError)),
            // Caught by the control loop before it gets here.
            ExitControlLoop => Ok(Reply::none()),
        }
    }
}

#[async_trait]
impl<Storage> ControlChanMiddleware for PrimaryEventHandler<Storage>
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&mut self, event: Event) -> Result<Reply, ControlChanError> {
        match event {
            Event::Command(cmd) => self.handle_command(cmd).await,
            Event::InternalMsg(msg) => self.handle_internal_msg(msg).await,
        }
    }
}

fn handle_control_channel_error(logger: &slog::Logger, error: ControlChanError) -> Reply {
    slog::warn!(logger, "Control channel error: {}", error);
    match error.kind() {
        ControlChanErrorKind::Utf8Error => Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"),
        ControlChanErrorKind::ParseError => Reply::new(ReplyCode::CommandSyntaxError, "Command line not properly terminated"),
        ControlChanErrorKind::InvalidCommand => Reply::new(ReplyCode::ParameterSyntaxError, "Invalid Parameter"),
        ControlChanErrorKind::IoError => Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"),
    }
}
