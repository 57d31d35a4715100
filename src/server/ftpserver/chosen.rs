//! Represents the chosen options that the activeftp user opted for.

use crate::{server::controlchan, storage::StorageBackend};
use std::{sync::Arc, time::Duration};

// Holds the options the activeftp user opted for.
pub struct OptionsHolder<Storage>
where
    Storage: StorageBackend,
{
    pub storage: Arc<dyn (Fn() -> Storage) + Send + Sync>,
    pub greeting: Option<&'static str>,
    pub require_login: bool,
    pub active_connect_timeout: Duration,
    pub transfer_chunk_size: usize,
    pub logger: slog::Logger,
}

impl<Storage> From<&OptionsHolder<Storage>> for controlchan::LoopConfig<Storage>
where
    Storage: StorageBackend + 'static,
{
    fn from(server: &OptionsHolder<Storage>) -> Self {
        controlchan::LoopConfig {
            storage: (server.storage)(),
            greeting: server.greeting,
            require_login: server.require_login,
            active_connect_timeout: server.active_connect_timeout,
            transfer_chunk_size: server.transfer_chunk_size,
            logger: server.logger.new(slog::o!()),
        }
    }
}
