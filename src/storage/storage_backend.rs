//! Defines the service provider interface for storage back-end implementors.

use super::error::{Error, ErrorKind};
use async_trait::async_trait;
use chrono::prelude::{DateTime, Utc};
use std::{
    fmt::{self, Debug, Formatter, Write},
    io::Cursor,
    path::{Path, PathBuf},
    result,
    time::SystemTime,
};

/// Result type used by traits in this module
pub type Result<T> = result::Result<T, Error>;

/// Represents the metadata of a _FTP File_
pub trait Metadata {
    /// Returns the length (size) of the file in bytes.
    fn len(&self) -> u64;

    /// Returns `self.len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the path is a directory.
    fn is_dir(&self) -> bool;

    /// Returns true if the path is a file.
    fn is_file(&self) -> bool;

    /// Returns true if the path is a symbolic link.
    fn is_symlink(&self) -> bool;

    /// Returns the last modified time of the path.
    fn modified(&self) -> Result<SystemTime>;

    /// Returns the `gid` of the file.
    fn gid(&self) -> u32;

    /// Returns the `uid` of the file.
    fn uid(&self) -> u32;

    /// Returns the number of links to the file. The default implementation always returns `1`
    fn links(&self) -> u64 {
        1
    }

    /// Returns the `permissions` of the file. The default implementation assumes unix permissions
    /// and defaults to "rwxr-xr-x" (octal 0755)
    fn permissions(&self) -> Permissions {
        Permissions(0o755)
    }
}

/// Represents the permissions of a _FTP File_
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(pub u32);

const PERM_READ: u32 = 0b100100100;
const PERM_WRITE: u32 = 0b010010010;
const PERM_EXEC: u32 = 0b001001001;
const PERM_USER: u32 = 0b111000000;
const PERM_GROUP: u32 = 0b000111000;
const PERM_OTHERS: u32 = 0b000000111;

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for class in [PERM_USER, PERM_GROUP, PERM_OTHERS] {
            f.write_char(if self.0 & class & PERM_READ > 0 { 'r' } else { '-' })?;
            f.write_char(if self.0 & class & PERM_WRITE > 0 { 'w' } else { '-' })?;
            f.write_char(if self.0 & class & PERM_EXEC > 0 { 'x' } else { '-' })?;
        }
        Ok(())
    }
}

/// Fileinfo contains the path and `Metadata` of a file. Its `Display` implementation renders the
/// `ls -l` style line that is sent to clients in response to `LIST`.
///
/// [`Metadata`]: ./trait.Metadata.html
#[derive(Clone, Debug)]
pub struct Fileinfo<P, M>
where
    P: AsRef<Path>,
    M: Metadata,
{
    /// The full path to the file
    pub path: P,
    /// The file's metadata
    pub metadata: M,
}

impl<P, M> fmt::Display for Fileinfo<P, M>
where
    P: AsRef<Path>,
    M: Metadata,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let modified: String = self
            .metadata
            .modified()
            .map(|x| DateTime::<Utc>::from(x).format("%b %d %H:%M").to_string())
            .unwrap_or_else(|_| "--- -- --:--".to_string());
        let basename = self.path.as_ref().components().next_back();
        let path = match basename {
            Some(v) => v.as_os_str().to_string_lossy(),
            None => {
                return Err(fmt::Error);
            }
        };
        write!(
            f,
            "{filetype}{permissions} {links:>12} {owner:>12} {group:>12} {size:#14} {modified:>12} {path}",
            filetype = if self.metadata.is_dir() {
                "d"
            } else if self.metadata.is_symlink() {
                "l"
            } else {
                "-"
            },
            permissions = self.metadata.permissions(),
            links = self.metadata.links(),
            owner = self.metadata.uid(),
            group = self.metadata.gid(),
            size = self.metadata.len(),
            modified = modified,
            path = path,
        )
    }
}

/// The `StorageBackend` trait can be implemented to serve files from something other than the
/// local disk. Paths handed to a back-end are always absolute and normalized (see
/// [`resolve`](crate::storage::resolve)); `/` is the root of whatever the back-end exposes.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// The concrete type of the _metadata_ used by this storage backend.
    type Metadata: Metadata + Sync + Send;

    /// Implement to set the name of the storage back-end. By default it returns the type signature.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the `Metadata` for the given file.
    ///
    /// [`Metadata`]: ./trait.Metadata.html
    async fn metadata<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Self::Metadata>;

    /// Returns the list of files in the given directory. Listing a plain file yields a single
    /// entry for that file.
    async fn list<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Vec<Fileinfo<PathBuf, Self::Metadata>>>;

    /// Returns some bytes that make up a directory listing that can immediately be sent to the
    /// client. Every entry is terminated by `\r\n`.
    #[tracing_attributes::instrument]
    async fn list_fmt<P>(&self, path: P) -> Result<Cursor<Vec<u8>>>
    where
        P: AsRef<Path> + Send + Debug,
        Self::Metadata: 'static,
    {
        let list = self.list(path).await?;

        let file_infos: Vec<u8> = list.iter().map(|fi| format!("{}\r\n", fi)).collect::<String>().into_bytes();

        Ok(Cursor::new(file_infos))
    }

    /// Returns the content of the given file.
    async fn get<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>>;

    /// Checks that the given path can become the working directory. The default implementation
    /// accepts any existing directory.
    async fn cwd<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<()> {
        let metadata = self.metadata(path).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(Error::from(ErrorKind::PermanentFileNotAvailable))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    struct FixedMeta {
        dir: bool,
        len: u64,
        modified: Option<SystemTime>,
        permissions: u32,
    }

    impl Metadata for FixedMeta {
        fn len(&self) -> u64 {
            self.len
        }

        fn is_dir(&self) -> bool {
            self.dir
        }

        fn is_file(&self) -> bool {
            !self.dir
        }

        fn is_symlink(&self) -> bool {
            false
        }

        fn modified(&self) -> Result<SystemTime> {
            self.modified.ok_or_else(|| ErrorKind::LocalError.into())
        }

        fn gid(&self) -> u32 {
            100
        }

        fn uid(&self) -> u32 {
            1000
        }

        fn permissions(&self) -> Permissions {
            Permissions(self.permissions)
        }
    }

    fn march_fourth() -> SystemTime {
        Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 0).unwrap().into()
    }

    #[test]
    fn permissions_render_as_rwx() {
        assert_eq!(Permissions(0o755).to_string(), "rwxr-xr-x");
        assert_eq!(Permissions(0o640).to_string(), "rw-r-----");
        assert_eq!(Permissions(0).to_string(), "---------");
    }

    #[test]
    fn fileinfo_formats_a_regular_file() {
        let fi = Fileinfo {
            path: PathBuf::from("/pub/hello.txt"),
            metadata: FixedMeta {
                dir: false,
                len: 42,
                modified: Some(march_fourth()),
                permissions: 0o644,
            },
        };
        assert_eq!(
            fi.to_string(),
            "-rw-r--r--            1         1000          100             42 Mar 04 05:06 hello.txt"
        );
    }

    #[test]
    fn fileinfo_formats_a_directory() {
        let fi = Fileinfo {
            path: PathBuf::from("pub"),
            metadata: FixedMeta {
                dir: true,
                len: 4096,
                modified: Some(march_fourth()),
                permissions: 0o755,
            },
        };
        let line = fi.to_string();
        assert!(line.starts_with("drwxr-xr-x "), "{}", line);
        assert!(line.ends_with(" Mar 04 05:06 pub"), "{}", line);
    }

    #[test]
    fn fileinfo_without_modification_time() {
        let fi = Fileinfo {
            path: PathBuf::from("x"),
            metadata: FixedMeta {
                dir: false,
                len: 0,
                modified: None,
                permissions: 0o600,
            },
        };
        assert!(fi.to_string().ends_with(" --- -- --:-- x"));
    }
}
