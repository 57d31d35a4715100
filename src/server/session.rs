//! The session module implements per-connection session handling and currently also
//! implements the handling for the *data* channel.

use crate::server::datachan::active::PendingDataConnection;
use crate::storage::StorageBackend;
use std::{fmt, net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};

// TraceId is an identifier used to correlate logs statements together.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TraceId(uuid::Uuid);

impl TraceId {
    pub fn new() -> Self {
        TraceId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

// The authentication phase of a session. It only ever moves forward.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SessionState {
    New,
    WaitPass,
    WaitCmd,
}

// This is where we keep the state for a ftp session.
#[derive(Debug)]
pub struct Session<Storage>
where
    Storage: StorageBackend,
{
    pub trace_id: TraceId,
    pub source: SocketAddr,
    pub storage: Arc<Storage>,
    pub username: Option<String>,
    pub state: SessionState,
    pub cwd: PathBuf,
    // Set by PORT, taken by the next LIST or RETR whatever the outcome.
    pub data_conn: Option<PendingDataConnection>,
    // The LIST or RETR that is still moving bytes, if any.
    pub data_transfer: Option<JoinHandle<()>>,
}

pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

impl<Storage> Session<Storage>
where
    Storage: StorageBackend + 'static,
{
    pub(super) fn new(storage: Arc<Storage>, source: SocketAddr) -> Self {
        Session {
            trace_id: TraceId::new(),
            source,
            storage,
            username: None,
            state: SessionState::New,
            cwd: "/".into(),
            data_conn: None,
            data_transfer: None,
        }
    }

    // Replaces the pending data connection, returning the one it replaces so the caller can log
    // that it's being closed.
    pub fn set_data_conn(&mut self, conn: PendingDataConnection) -> Option<PendingDataConnection> {
        self.data_conn.replace(conn)
    }

    pub fn take_data_conn(&mut self) -> Option<PendingDataConnection> {
        self.data_conn.take()
    }

    pub fn transfer_in_progress(&self) -> bool {
        self.data_transfer.is_some()
    }

    // Aborts a running transfer, closing its data connection, and drops any pending data
    // connection.
    pub fn close_data_connections(&mut self) {
        if let Some(handle) = self.data_transfer.take() {
            handle.abort();
        }
        self.data_conn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Filesystem;
    use pretty_assertions::assert_eq;

    fn session() -> (tempfile::TempDir, Session<Filesystem>) {
        let root = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(root.path()).unwrap();
        (root, Session::new(Arc::new(fs), "127.0.0.1:50000".parse().unwrap()))
    }

    #[test]
    fn starts_unauthenticated_at_root() {
        let (_root, session) = session();
        assert_eq!(session.state, SessionState::New);
        assert_eq!(session.cwd, PathBuf::from("/"));
        assert!(session.data_conn.is_none());
        assert!(!session.transfer_in_progress());
    }

    #[test]
    fn remembers_the_peer() {
        let (_root, session) = session();
        assert_eq!(session.source, "127.0.0.1:50000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn trace_ids_differ() {
        assert_ne!(TraceId::new(), TraceId::new());
        assert_eq!(TraceId::new().to_string().len(), 32);
    }
}
