//! Contains the code that listens to control channel connections.

use super::{ServerError, chosen::OptionsHolder};
use crate::{
    server::{controlchan, shutdown},
    storage::StorageBackend,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

// Listener listens for control channel connections on a TCP port and spawns a control channel loop
// in a new task for each incoming connection.
pub struct Listener<Storage>
where
    Storage: StorageBackend,
{
    pub listener: TcpListener,
    pub logger: slog::Logger,
    pub options: OptionsHolder<Storage>,
    pub shutdown_topic: std::sync::Arc<shutdown::Notifier>,
}

impl<Storage> Listener<Storage>
where
    Storage: StorageBackend + 'static,
{
    // Binds the control port so that the caller finds out about a bad address before any session
    // starts.
    pub async fn bind(bind_address: SocketAddr, logger: slog::Logger, options: OptionsHolder<Storage>, shutdown_topic: std::sync::Arc<shutdown::Notifier>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(bind_address).await?;
        slog::info!(logger, "Listening on {}", listener.local_addr()?);
        Ok(Listener {
            listener,
            logger,
            options,
            shutdown_topic,
        })
    }

    // Accepts connections until the future holding this listener is dropped.
    pub async fn listen(self) -> Result<(), ServerError> {
        let Listener {
            listener,
            logger,
            options,
            shutdown_topic,
        } = self;
        loop {
            match listener.accept().await {
                Ok((tcp_stream, socket_addr)) => {
                    slog::info!(logger, "Incoming control connection from {:?}", socket_addr);
                    let shutdown_listener = shutdown_topic.subscribe().await;
                    let result = controlchan::spawn_loop::<Storage>((&options).into(), tcp_stream, shutdown_listener).await;
                    if let Err(err) = result {
                        slog::error!(logger, "Could not spawn control channel loop for connection from {:?}: {:?}", socket_addr, err)
                    }
                }
                Err(err) => {
                    slog::error!(logger, "Error accepting incoming control connection {:?}", err);
                }
            }
        }
    }
}
