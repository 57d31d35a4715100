//! Contains code pertaining to the FTP *data* channel: connecting out to the client and moving
//! the bytes of a listing or file over that connection.

pub(crate) mod active;
pub(crate) mod error;

use crate::server::chancomms::ControlChanMsg;
use std::io::Cursor;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc::Sender,
    task::JoinHandle,
};

/// What to send over the data connection. The storage query already succeeded by the time a
/// `Transfer` exists.
pub(crate) enum Transfer {
    List {
        listing: Cursor<Vec<u8>>,
    },
    Retr {
        path: String,
        reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
    },
}

impl std::fmt::Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transfer::List { listing } => write!(f, "List {{ bytes: {} }}", listing.get_ref().len()),
            Transfer::Retr { path, .. } => write!(f, "Retr {{ path: {:?} }}", path),
        }
    }
}

// Runs a single transfer over a data connection and reports the outcome to the control loop.
struct DataCommandExecutor {
    socket: TcpStream,
    control_msg_tx: Sender<ControlChanMsg>,
    chunk_size: usize,
    logger: slog::Logger,
}

impl DataCommandExecutor {
    async fn execute(self, transfer: Transfer) {
        match transfer {
            Transfer::List { listing } => self.exec_list(listing).await,
            Transfer::Retr { path, reader } => self.exec_retr(path, reader).await,
        }
    }

    #[tracing_attributes::instrument(skip(self, reader))]
    async fn exec_retr(mut self, path: String, mut reader: Box<dyn AsyncRead + Send + Sync + Unpin>) {
        let mut buffer = vec![0_u8; self.chunk_size];
        let mut bytes_copied: u64 = 0;
        let msg = loop {
            let n = match reader.read(&mut buffer).await {
                Ok(0) => break ControlChanMsg::SentData { path, bytes: bytes_copied },
                Ok(n) => n,
                Err(err) => {
                    slog::warn!(self.logger, "Error reading from storage during RETR: {}", err; "path" => &path);
                    break ControlChanMsg::ReadFailed;
                }
            };
            if let Err(err) = self.socket.write_all(&buffer[..n]).await {
                slog::warn!(self.logger, "Error writing to data connection during RETR: {}", err; "path" => &path);
                break ControlChanMsg::ConnectionReset;
            }
            bytes_copied += n as u64;
        };
        self.finish(msg).await;
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn exec_list(mut self, listing: Cursor<Vec<u8>>) {
        let bytes = listing.get_ref().len() as u64;
        let msg = match self.socket.write_all(listing.get_ref()).await {
            Ok(()) => ControlChanMsg::DirectorySuccessfullyListed { bytes },
            Err(err) => {
                slog::warn!(self.logger, "Error writing to data connection during LIST: {}", err);
                ControlChanMsg::ConnectionReset
            }
        };
        self.finish(msg).await;
    }

    // Closes the data connection and only then tells the control loop, so that the final reply
    // never overtakes the data.
    async fn finish(mut self, msg: ControlChanMsg) {
        if let Err(err) = self.socket.shutdown().await {
            slog::debug!(self.logger, "Could not shutdown data connection: {}", err);
        }
        drop(self.socket);
        if let Err(err) = self.control_msg_tx.send(msg).await {
            slog::error!(self.logger, "Could not notify control channel of data transfer result: {}", err);
        }
    }
}

/// Starts moving `transfer` over `socket` in its own task. The returned handle can be used to
/// abort the transfer, which also closes the data connection.
pub(crate) fn spawn_transfer(
    logger: slog::Logger,
    socket: TcpStream,
    transfer: Transfer,
    chunk_size: usize,
    control_msg_tx: Sender<ControlChanMsg>,
) -> JoinHandle<()> {
    let executor = DataCommandExecutor {
        socket,
        control_msg_tx,
        chunk_size,
        logger,
    };
    tokio::spawn(executor.execute(transfer))
}
