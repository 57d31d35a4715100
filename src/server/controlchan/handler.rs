use crate::{
    server::{
        chancomms::ControlChanMsg,
        controlchan::{Reply, error::ControlChanError},
        session::SharedSession,
    },
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::{result::Result, time::Duration};
use tokio::sync::mpsc::Sender;

// Common interface for all handlers of `Commands`
#[async_trait]
pub(crate) trait CommandHandler<Storage>: Send + Sync + std::fmt::Debug
where
    Storage: StorageBackend + 'static,
{
    async fn handle(&self, args: CommandContext<Storage>) -> Result<Reply, ControlChanError>;
}

/// Represents arguments passed to a `CommandHandler`
#[derive(Debug)]
pub(crate) struct CommandContext<Storage>
where
    Storage: StorageBackend + 'static,
{
    pub session: SharedSession<Storage>,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub active_connect_timeout: Duration,
    pub transfer_chunk_size: usize,
    pub logger: slog::Logger,
}
