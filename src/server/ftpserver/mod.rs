//! Contains the [`Server`] and the [`ServerBuilder`] that configures it.

mod chosen;
pub mod error;
mod listen;
pub mod options;

use crate::{
    server::{
        ftpserver::{chosen::OptionsHolder, error::ServerError},
        shutdown::{self, Shutdown},
    },
    storage::{Filesystem, StorageBackend},
};
use slog::Drain;
use std::{fmt::Debug, future::Future, net::SocketAddr, path::PathBuf, pin::Pin, sync::Arc, time::Duration};

type ShutdownIndicator = Pin<Box<dyn Future<Output = Shutdown> + Send + Sync>>;

/// Used to create [`Server`]s.
///
/// # Example
///
/// ```rust
/// use activeftp::ServerBuilder;
/// use activeftp::storage::Filesystem;
///
/// let root = std::env::temp_dir();
/// let server = ServerBuilder::new(Box::new(move || Filesystem::new(root.clone()).unwrap()))
///     .greeting("Welcome to my FTP server")
///     .build()
///     .unwrap();
/// ```
pub struct ServerBuilder<Storage>
where
    Storage: StorageBackend,
{
    // Absent only when `with_fs` could not open its root, `invalid` says why.
    storage: Option<Box<dyn (Fn() -> Storage) + Send + Sync>>,
    greeting: Option<&'static str>,
    logger: slog::Logger,
    require_login: bool,
    active_connect_timeout: Duration,
    transfer_chunk_size: usize,
    passive_port: Option<u16>,
    shutdown: Option<ShutdownIndicator>,
    // A problem detected while configuring, reported by `build`.
    invalid: Option<ServerError>,
}

impl ServerBuilder<Filesystem> {
    /// Creates a builder for a server that serves the files under `root`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::Server;
    ///
    /// let server = Server::with_fs(std::env::temp_dir()).build().unwrap();
    /// ```
    pub fn with_fs<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        match Filesystem::new(root.clone()) {
            // Sessions share the handle on the root directory.
            Ok(fs) => ServerBuilder::new(Box::new(move || fs.clone())),
            Err(err) => ServerBuilder::with_storage(
                None,
                Some(ServerError::invalid_configuration(format!("cannot serve {}: {}", root.display(), err))),
            ),
        }
    }
}

impl<Storage> ServerBuilder<Storage>
where
    Storage: StorageBackend + 'static,
{
    /// Construct a new [`ServerBuilder`] with the given [`StorageBackend`] generator. Every
    /// session gets its own instance. The other parameters will be set to defaults.
    pub fn new(storage: Box<dyn (Fn() -> Storage) + Send + Sync>) -> Self {
        Self::with_storage(Some(storage), None)
    }

    fn with_storage(storage: Option<Box<dyn (Fn() -> Storage) + Send + Sync>>, invalid: Option<ServerError>) -> Self {
        ServerBuilder {
            storage,
            greeting: options::DEFAULT_GREETING,
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
            require_login: options::DEFAULT_REQUIRE_LOGIN,
            active_connect_timeout: options::DEFAULT_ACTIVE_CONNECT_TIMEOUT,
            transfer_chunk_size: options::DEFAULT_TRANSFER_CHUNK_SIZE,
            passive_port: None,
            shutdown: None,
            invalid,
        }
    }

    /// Set the greeting that will be sent to the client after connecting. Without one the server
    /// stays silent until the first command.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::Server;
    ///
    /// let server = Server::with_fs("/tmp").greeting("Welcome to my FTP Server");
    /// ```
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = Some(greeting);
        self
    }

    /// Sets the structured logger (<https://docs.rs/slog>) to use. `None` keeps the default,
    /// which forwards to the `log` crate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::Server;
    ///
    /// let server = Server::with_fs("/tmp").logger(Some(slog::Logger::root(slog::Discard, slog::o!())));
    /// ```
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        if let Some(logger) = logger.into() {
            self.logger = logger;
        }
        self
    }

    /// Makes clients log in with `USER` and `PASS` before anything but `HELP` and `QUIT`. Any
    /// username and password is accepted.
    pub fn require_login(mut self, required: bool) -> Self {
        self.require_login = required;
        self
    }

    /// How long connecting to the endpoint a client gave with `PORT` may take.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::Server;
    /// use std::time::Duration;
    ///
    /// let server = Server::with_fs("/tmp").active_connect_timeout(Duration::from_secs(2));
    /// ```
    pub fn active_connect_timeout(mut self, timeout: Duration) -> Self {
        self.active_connect_timeout = timeout;
        self
    }

    /// The number of bytes read from storage and written to the data connection at a time.
    /// Zero is rejected by [`build`](Self::build).
    pub fn transfer_chunk_size(mut self, size: usize) -> Self {
        self.transfer_chunk_size = size;
        self
    }

    /// Reserves a port for passive mode. Passive mode isn't supported so nothing binds to it.
    pub fn passive_port(mut self, port: u16) -> Self {
        self.passive_port = Some(port);
        self
    }

    /// Allows telling the server when and how to shutdown gracefully. Once the future resolves
    /// the server stops accepting connections, every session replies `421` and closes, and
    /// [`Server::listen`] returns after the sessions ended or the grace period ran out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::{Server, Shutdown};
    /// use std::time::Duration;
    ///
    /// let server = Server::with_fs("/tmp").shutdown_indicator(async {
    ///     tokio::time::sleep(Duration::from_secs(60)).await;
    ///     Shutdown::new().grace_period(Duration::from_secs(5))
    /// });
    /// ```
    pub fn shutdown_indicator<I>(mut self, indicator: I) -> Self
    where
        I: Future<Output = Shutdown> + Send + Sync + 'static,
    {
        self.shutdown = Some(Box::pin(indicator));
        self
    }

    /// Finalize the options and build a [`Server`].
    pub fn build(self) -> Result<Server<Storage>, ServerError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        let storage = self
            .storage
            .ok_or_else(|| ServerError::invalid_configuration("no storage back-end configured"))?;
        if self.transfer_chunk_size == 0 {
            return Err(ServerError::invalid_configuration("transfer chunk size must be greater than zero"));
        }
        Ok(Server {
            storage: Arc::from(storage),
            greeting: self.greeting,
            logger: self.logger,
            require_login: self.require_login,
            active_connect_timeout: self.active_connect_timeout,
            transfer_chunk_size: self.transfer_chunk_size,
            passive_port: self.passive_port,
            shutdown: self.shutdown,
        })
    }
}

impl<Storage> Debug for ServerBuilder<Storage>
where
    Storage: StorageBackend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("greeting", &self.greeting)
            .field("logger", &self.logger)
            .field("require_login", &self.require_login)
            .field("active_connect_timeout", &self.active_connect_timeout)
            .field("transfer_chunk_size", &self.transfer_chunk_size)
            .field("passive_port", &self.passive_port)
            .field("invalid", &self.invalid)
            .finish()
    }
}

/// An instance of an FTP server. It aggregates a [`StorageBackend`] generator that every session
/// gets its own instance from.
///
/// The server can be started with the [`listen`](Self::listen) method.
///
/// # Example
///
/// ```no_run
/// use activeftp::Server;
/// use tokio::runtime::Runtime;
///
/// let mut rt = Runtime::new().unwrap();
/// let server = Server::with_fs("/srv/ftp").build().unwrap();
/// rt.spawn(server.listen("127.0.0.1:2121"));
/// // ...
/// drop(rt);
/// ```
pub struct Server<Storage>
where
    Storage: StorageBackend,
{
    storage: Arc<dyn (Fn() -> Storage) + Send + Sync>,
    greeting: Option<&'static str>,
    logger: slog::Logger,
    require_login: bool,
    active_connect_timeout: Duration,
    transfer_chunk_size: usize,
    passive_port: Option<u16>,
    shutdown: Option<ShutdownIndicator>,
}

impl Server<Filesystem> {
    /// Create a new [`ServerBuilder`] for a server that serves the files under `root`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use activeftp::Server;
    ///
    /// let server = Server::with_fs("/srv/ftp");
    /// ```
    pub fn with_fs<P: Into<PathBuf>>(root: P) -> ServerBuilder<Filesystem> {
        ServerBuilder::with_fs(root)
    }
}

impl<Storage> Server<Storage>
where
    Storage: StorageBackend + 'static,
{
    /// Runs the main ftp process asynchronously. Should be started in a async runtime context.
    ///
    /// Returns an error when the address can't be parsed or bound. Otherwise it only returns
    /// after the shutdown indicator fired and the sessions ended, or never when there is none.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use activeftp::Server;
    /// use tokio::runtime::Runtime;
    ///
    /// let mut rt = Runtime::new().unwrap();
    /// let server = Server::with_fs("/srv/ftp").build().unwrap();
    /// rt.spawn(server.listen("127.0.0.1:2121"));
    /// // ...
    /// drop(rt);
    /// ```
    #[tracing_attributes::instrument]
    pub async fn listen<T: Into<String> + Debug>(self, bind_address: T) -> Result<(), ServerError> {
        let logger = self.logger.clone();
        let bind_address: SocketAddr = bind_address.into().parse()?;
        let shutdown_notifier = Arc::new(shutdown::Notifier::new());

        if let Some(port) = self.passive_port {
            slog::info!(logger, "Passive port {} is reserved but passive mode is not supported", port);
        }

        let (options, shutdown_indicator) = self.into_parts();
        let listener = listen::Listener::bind(bind_address, logger.clone(), options, shutdown_notifier.clone()).await?;

        let shutdown_indicator: ShutdownIndicator = match shutdown_indicator {
            Some(indicator) => indicator,
            None => Box::pin(futures_util::future::pending()),
        };

        tokio::select! {
            result = listener.listen() => result,
            opts = shutdown_indicator => {
                slog::info!(logger, "Shutting down within {:?}", opts.grace_period);
                shutdown_notifier.notify().await;
                Self::shutdown_linger(logger, shutdown_notifier, opts.grace_period).await
            }
        }
    }

    // Waits for sessions to end, giving up after the grace period.
    async fn shutdown_linger(logger: slog::Logger, shutdown_notifier: Arc<shutdown::Notifier>, grace_period: Duration) -> Result<(), ServerError> {
        match tokio::time::timeout(grace_period, shutdown_notifier.linger()).await {
            Ok(_) => {
                slog::info!(logger, "Graceful shutdown complete");
                Ok(())
            }
            Err(_) => {
                slog::warn!(logger, "Shutdown grace period of {:?} exceeded, not all sessions ended", grace_period);
                Ok(())
            }
        }
    }

    fn into_parts(self) -> (OptionsHolder<Storage>, Option<ShutdownIndicator>) {
        let options = OptionsHolder {
            storage: self.storage,
            greeting: self.greeting,
            require_login: self.require_login,
            active_connect_timeout: self.active_connect_timeout,
            transfer_chunk_size: self.transfer_chunk_size,
            logger: self.logger,
        };
        (options, self.shutdown)
    }
}

impl<Storage> Debug for Server<Storage>
where
    Storage: StorageBackend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("greeting", &self.greeting)
            .field("logger", &self.logger)
            .field("require_login", &self.require_login)
            .field("active_connect_timeout", &self.active_connect_timeout)
            .field("transfer_chunk_size", &self.transfer_chunk_size)
            .field("passive_port", &self.passive_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ftpserver::error::ServerErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_with_defaults() {
        let root = tempfile::tempdir().unwrap();
        let server = Server::with_fs(root.path()).build().unwrap();
        assert_eq!(server.greeting, None);
        assert!(!server.require_login);
        assert_eq!(server.active_connect_timeout, options::DEFAULT_ACTIVE_CONNECT_TIMEOUT);
        assert_eq!(server.transfer_chunk_size, 8192);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = Server::with_fs(root.path()).transfer_chunk_size(0).build().unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidConfiguration);
    }

    #[test]
    fn missing_root_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = Server::with_fs(root.path().join("nope")).build().unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidConfiguration);
    }

    #[tokio::test]
    async fn bad_address_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let server = Server::with_fs(root.path()).build().unwrap();
        let err = server.listen("not an address").await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidAddress);
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let root = tempfile::tempdir().unwrap();
        let server = Server::with_fs(root.path()).build().unwrap();
        let err = server.listen(taken.local_addr().unwrap().to_string()).await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::Io);
    }
}
