//! A [`StorageBackend`] that uses a local filesystem, like a traditional FTP server.

use super::{Error, ErrorKind, Fileinfo, Metadata, Permissions, Result, StorageBackend, cap_fs};
use async_trait::async_trait;
use cfg_if::cfg_if;
use lazy_static::lazy_static;
use std::{
    fmt::Debug,
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

#[cfg(unix)]
use cap_std::fs::{MetadataExt, PermissionsExt};

/// The Filesystem struct is an implementation of the StorageBackend trait that keeps its files
/// inside a specific root directory on local disk.
#[derive(Debug, Clone)]
pub struct Filesystem {
    // Every lookup goes through this handle, which keeps it under the root.
    root_fd: Arc<cap_std::fs::Dir>,
    root: PathBuf,
}

/// Metadata for the storage back-end
#[derive(Debug)]
pub struct Meta {
    inner: cap_std::fs::Metadata,
}

/// Strip the "/" prefix, if any, from a path.  Suitable for preprocessing the input pathnames
/// supplied by the FTP client.
fn strip_prefixes(path: &Path) -> &Path {
    lazy_static! {
        static ref DOT: PathBuf = PathBuf::from(".");
        static ref SLASH: PathBuf = PathBuf::from("/");
    }
    if path == SLASH.as_path() {
        DOT.as_path()
    } else {
        path.strip_prefix("/").unwrap_or(path)
    }
}

impl Filesystem {
    /// Create a new Filesystem backend, with the given root. No operations can take place outside
    /// of the root, not even through a symlink. For example, when the `Filesystem` root is set to
    /// `/srv/ftp`, and a client asks for `hello.txt`, the server will send it `/srv/ftp/hello.txt`.
    ///
    /// Fails if the root is not an existing directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> io::Result<Self> {
        let root = root.into();
        let aa = cap_std::ambient_authority();
        let root_fd = Arc::new(cap_std::fs::Dir::open_ambient_dir(&root, aa)?);
        Ok(Filesystem { root_fd, root })
    }

    /// Returns the directory on local disk that is exposed as `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // Turns a virtual path into one relative to the root. `..` can never occur in a resolved
    // path, so one showing up here means the caller bypassed resolution.
    fn relative_path(path: &Path) -> Result<&Path> {
        let relative = strip_prefixes(path);
        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(Error::from(ErrorKind::FileNameNotAllowedError));
        }
        Ok(relative)
    }
}

#[async_trait]
impl StorageBackend for Filesystem {
    type Metadata = Meta;

    #[tracing_attributes::instrument]
    async fn metadata<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Self::Metadata> {
        let path = Self::relative_path(path.as_ref())?;
        let inner = cap_fs::symlink_metadata(self.root_fd.clone(), path).await?;
        Ok(Meta { inner })
    }

    #[tracing_attributes::instrument]
    async fn list<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Vec<Fileinfo<PathBuf, Self::Metadata>>> {
        let relative = Self::relative_path(path.as_ref())?;
        // Follow a symlink to a directory, so listing it agrees with CWD into it.
        let meta = cap_fs::metadata(self.root_fd.clone(), relative).await?;
        if !meta.is_dir() {
            let inner = cap_fs::symlink_metadata(self.root_fd.clone(), relative).await?;
            return Ok(vec![Fileinfo {
                path: path.as_ref().to_path_buf(),
                metadata: Meta { inner },
            }]);
        }

        let mut fis: Vec<Fileinfo<PathBuf, Meta>> = cap_fs::read_dir(self.root_fd.clone(), relative)
            .await?
            .into_iter()
            .map(|(name, inner)| Fileinfo {
                path: PathBuf::from(name),
                metadata: Meta { inner },
            })
            .collect();
        fis.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(fis)
    }

    #[tracing_attributes::instrument]
    async fn get<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>> {
        let path = Self::relative_path(path.as_ref())?;
        // Opening a directory succeeds on unix, reading from it does not.
        if cap_fs::metadata(self.root_fd.clone(), path).await?.is_dir() {
            return Err(Error::from(ErrorKind::PermanentFileNotAvailable));
        }
        let file = cap_fs::open(self.root_fd.clone(), path).await?;
        let file = tokio::fs::File::from_std(file.into_std());

        Ok(Box::new(tokio::io::BufReader::with_capacity(4096, file)) as Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>)
    }

    #[tracing_attributes::instrument]
    async fn cwd<P: AsRef<Path> + Send + Debug>(&self, path: P) -> Result<()> {
        let path = Self::relative_path(path.as_ref())?;
        // Follows symlinks, a link to a directory under the root is a fine working directory.
        if cap_fs::metadata(self.root_fd.clone(), path).await?.is_dir() {
            Ok(())
        } else {
            Err(Error::from(ErrorKind::PermanentFileNotAvailable))
        }
    }
}

impl Metadata for Meta {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    fn is_file(&self) -> bool {
        self.inner.is_file()
    }

    fn is_symlink(&self) -> bool {
        self.inner.file_type().is_symlink()
    }

    fn modified(&self) -> Result<SystemTime> {
        self.inner.modified().map(cap_std::time::SystemTime::into_std).map_err(|e| e.into())
    }

    fn gid(&self) -> u32 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.gid()
            } else {
                0
            }
        }
    }

    fn uid(&self) -> u32 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.uid()
            } else {
                0
            }
        }
    }

    fn links(&self) -> u64 {
        cfg_if! {
            if #[cfg(unix)] {
                self.inner.nlink()
            } else {
                1
            }
        }
    }

    fn permissions(&self) -> Permissions {
        cfg_if! {
            if #[cfg(unix)] {
                Permissions(self.inner.permissions().mode())
            } else {
                Permissions(if self.inner.permissions().readonly() { 0o555 } else { 0o755 })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    #[test]
    fn fs_strip_prefixes() {
        assert_eq!(strip_prefixes(Path::new("foo/bar")), Path::new("foo/bar"));
        assert_eq!(strip_prefixes(Path::new("/foo/bar")), Path::new("foo/bar"));
        assert_eq!(strip_prefixes(Path::new("/")), Path::new("."));
    }

    #[test]
    fn fs_new_rejects_missing_root() {
        let root = tempfile::tempdir().unwrap();
        assert!(Filesystem::new(root.path().join("nope")).is_err());
    }

    #[tokio::test]
    async fn fs_stat() {
        let root = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new_in(root.path()).unwrap();
        file.write_all(b"hello").unwrap();
        let filename = file.path().file_name().unwrap().to_owned();
        let meta = file.as_file().metadata().unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        let my_meta = fs.metadata(Path::new("/").join(filename)).await.unwrap();

        assert_eq!(meta.is_dir(), my_meta.is_dir());
        assert_eq!(meta.is_file(), my_meta.is_file());
        assert_eq!(meta.len(), my_meta.len());
        assert_eq!(meta.modified().unwrap(), my_meta.modified().unwrap());
    }

    #[tokio::test]
    async fn fs_list() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("b.txt"), b"bb").unwrap();
        std::fs::create_dir(root.path().join("a")).unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        let my_list = fs.list("/").await.unwrap();

        assert_eq!(my_list.len(), 2);
        assert_eq!(my_list[0].path, PathBuf::from("a"));
        assert!(my_list[0].metadata.is_dir());
        assert_eq!(my_list[1].path, PathBuf::from("b.txt"));
        assert_eq!(my_list[1].metadata.len(), 2);
    }

    #[tokio::test]
    async fn fs_list_of_a_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("only.txt"), b"x").unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        let my_list = fs.list("/only.txt").await.unwrap();

        assert_eq!(my_list.len(), 1);
        assert!(my_list[0].to_string().ends_with(" only.txt"));
    }

    #[tokio::test]
    async fn fs_list_fmt() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("one"), b"1").unwrap();
        std::fs::write(root.path().join("two"), b"22").unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        let listing = String::from_utf8(fs.list_fmt("/").await.unwrap().into_inner()).unwrap();

        let lines: Vec<&str> = listing.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('-') && lines[0].ends_with(" one"));
        assert!(lines[1].ends_with(" two"));
        assert!(listing.ends_with("\r\n"));
    }

    #[tokio::test]
    async fn fs_list_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(root.path()).unwrap();
        let err = fs.list("/missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermanentFileNotAvailable);
    }

    #[tokio::test]
    async fn fs_get() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        std::fs::write(root.path().join("sub").join("data.bin"), b"0123456789").unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        let mut reader = fs.get("/sub/data.bin").await.unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();

        assert_eq!(content, b"0123456789");
    }

    #[tokio::test]
    async fn fs_get_directory_fails() {
        let root = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(root.path()).unwrap();
        assert!(fs.get("/").await.is_err());
    }

    #[tokio::test]
    async fn fs_cwd() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("dir")).unwrap();
        std::fs::write(root.path().join("file"), b"").unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        assert!(fs.cwd("/").await.is_ok());
        assert!(fs.cwd("/dir").await.is_ok());
        assert_eq!(fs.cwd("/file").await.unwrap_err().kind(), ErrorKind::PermanentFileNotAvailable);
        assert_eq!(fs.cwd("/nope").await.unwrap_err().kind(), ErrorKind::PermanentFileNotAvailable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fs_symlink_cannot_leave_root() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"outside-the-root").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("escape")).unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        assert!(fs.get("/escape/secret.txt").await.is_err());
        assert!(fs.list("/escape").await.is_err());
        assert!(fs.cwd("/escape").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fs_list_follows_symlinked_dir() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("real")).unwrap();
        std::fs::write(root.path().join("real").join("a.txt"), b"a").unwrap();
        std::fs::write(root.path().join("real").join("b.txt"), b"b").unwrap();
        std::os::unix::fs::symlink("real", root.path().join("sub")).unwrap();

        let fs = Filesystem::new(root.path()).unwrap();
        assert!(fs.cwd("/sub").await.is_ok());
        let names: Vec<PathBuf> = fs.list("/sub").await.unwrap().into_iter().map(|fi| fi.path).collect();
        assert_eq!(names, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);

        // In the parent listing the link itself is shown.
        let top = fs.list("/").await.unwrap();
        let link = top.iter().find(|fi| fi.path == Path::new("sub")).unwrap();
        assert!(link.metadata.is_symlink());
    }

    #[tokio::test]
    async fn fs_refuses_to_leave_root() {
        let root = tempfile::tempdir().unwrap();
        let fs = Filesystem::new(root.path()).unwrap();
        assert_eq!(fs.metadata("/../etc").await.unwrap_err().kind(), ErrorKind::FileNameNotAllowedError);
    }
}
