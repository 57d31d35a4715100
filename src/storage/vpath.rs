use super::error::{Error, ErrorKind};
use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};

/// Resolves a client supplied path argument against the session's current working directory.
///
/// Absolute arguments replace `cwd`, relative ones are appended to it. The result is normalized
/// lexically: `.` segments and repeated slashes disappear and `..` removes the preceding
/// segment, but never climbs above `/`. Arguments containing a NUL byte are rejected.
///
/// # Example
///
/// ```rust
/// use activeftp::storage::resolve;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(resolve(Path::new("/pub"), "../etc/./motd").unwrap(), PathBuf::from("/etc/motd"));
/// assert_eq!(resolve(Path::new("/"), "..").unwrap(), PathBuf::from("/"));
/// ```
pub fn resolve(cwd: &Path, arg: &str) -> Result<PathBuf, Error> {
    if arg.contains('\0') {
        return Err(Error::from(ErrorKind::FileNameNotAllowedError));
    }

    let mut segments: Vec<&OsStr> = Vec::new();
    let arg = Path::new(arg);
    if !arg.has_root() {
        push_segments(cwd, &mut segments);
    }
    push_segments(arg, &mut segments);

    let mut resolved = PathBuf::from("/");
    resolved.extend(segments);
    Ok(resolved)
}

fn push_segments<'a>(path: &'a Path, segments: &mut Vec<&'a OsStr>) {
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => segments.clear(),
            Component::CurDir => {}
            Component::ParentDir => {
                segments.pop();
            }
            Component::Normal(name) => segments.push(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn r(cwd: &str, arg: &str) -> PathBuf {
        resolve(Path::new(cwd), arg).unwrap()
    }

    #[test]
    fn relative_joins_cwd() {
        assert_eq!(r("/pub", "docs"), PathBuf::from("/pub/docs"));
        assert_eq!(r("/", "docs/a.txt"), PathBuf::from("/docs/a.txt"));
    }

    #[test]
    fn absolute_replaces_cwd() {
        assert_eq!(r("/pub/docs", "/shit"), PathBuf::from("/shit"));
    }

    #[test]
    fn empty_argument_is_cwd() {
        assert_eq!(r("/pub", ""), PathBuf::from("/pub"));
    }

    #[test]
    fn dots_and_slashes_are_normalized() {
        assert_eq!(r("/", "a//b/./c/"), PathBuf::from("/a/b/c"));
        assert_eq!(r("/a/b", "../c"), PathBuf::from("/a/c"));
    }

    #[test]
    fn parent_never_climbs_above_root() {
        assert_eq!(r("/", ".."), PathBuf::from("/"));
        assert_eq!(r("/a", "../../../etc"), PathBuf::from("/etc"));
        assert_eq!(r("/", "/../.."), PathBuf::from("/"));
    }

    #[test]
    fn nul_is_rejected() {
        let err = resolve(Path::new("/"), "a\0b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNameNotAllowedError);
    }
}
