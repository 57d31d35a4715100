//! The most basic usage: serve the temp directory on port 2121 and log to the terminal.

use activeftp::Server;
use slog::{Drain, o};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = slog::Logger::root(drain, o!());

    let addr = "127.0.0.1:2121";
    let server = Server::with_fs(std::env::temp_dir())
        .greeting("Welcome to the activeftp demo server")
        .logger(Some(logger))
        .build()
        .unwrap();

    println!("Starting ftp server on {}", addr);
    server.listen(addr).await.unwrap();
}
