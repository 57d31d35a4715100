//! Async helpers over a [`cap_std::fs::Dir`], in the manner of `tokio::fs`.
//
// Every path is looked up relative to the directory handle. cap-std refuses absolute paths and
// anything, symlinks included, that resolves to a place outside of it.

use std::{io, path::Path, sync::Arc};
use tokio::task::spawn_blocking;

// Same as tokio::fs::asyncify
async fn asyncify<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::other("background task failed")),
    }
}

pub async fn open<P: AsRef<Path>>(root: Arc<cap_std::fs::Dir>, path: P) -> io::Result<cap_std::fs::File> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.open(path)).await
}

/// Queries the metadata of a path, following symlinks as long as they stay under `root`.
pub async fn metadata<P: AsRef<Path>>(root: Arc<cap_std::fs::Dir>, path: P) -> io::Result<cap_std::fs::Metadata> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.metadata(path)).await
}

/// Queries the metadata of a path without following a symlink at its end.
pub async fn symlink_metadata<P: AsRef<Path>>(root: Arc<cap_std::fs::Dir>, path: P) -> io::Result<cap_std::fs::Metadata> {
    let path = path.as_ref().to_owned();
    asyncify(move || root.symlink_metadata(path)).await
}

/// Reads the names and (not followed) metadata of the entries of a directory.
pub async fn read_dir<P: AsRef<Path>>(root: Arc<cap_std::fs::Dir>, path: P) -> io::Result<Vec<(std::ffi::OsString, cap_std::fs::Metadata)>> {
    let path = path.as_ref().to_owned();
    asyncify(move || {
        let mut entries = Vec::new();
        for entry in root.read_dir(path)? {
            let entry = entry?;
            // DirEntry::metadata does not traverse a symlink entry.
            entries.push((entry.file_name(), entry.metadata()?));
        }
        Ok(entries)
    })
    .await
}
