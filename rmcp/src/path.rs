use common::Remote;

/// Where a path lives once mount points are taken into account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathType {
    /// Plain local path, not under any known mount point
    Local(String),
    /// rclone remote identifier: `name:bucket/relative/path`
    Remote(String),
}

impl PathType {
    /// The string to hand to rclone
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            PathType::Local(path) | PathType::Remote(path) => path,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, PathType::Remote(_))
    }
}

#[must_use]
pub fn ends_with_separator(path: &str) -> bool {
    path.ends_with(std::path::MAIN_SEPARATOR)
}

/// Lexically normalize `path`: drops `.` components and trailing separators, resolves `..`
///
/// Symlinks are NOT resolved, a path under a mount point must stay under it.
fn normalize(path: &std::path::Path) -> std::path::PathBuf {
    let mut normalized = std::path::PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                // popping the root is a no-op, "/.." is "/"
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Make `path` absolute relative to the current working directory and normalize it
pub fn absolute_path(path: &str) -> std::io::Result<std::path::PathBuf> {
    let path = std::path::Path::new(path);
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize(&cwd.join(path)))
}

/// Returns the part of `path` below `mountpoint`, `None` if `path` is not inside it
fn relative_to_mountpoint<'a>(
    path: &'a std::path::Path,
    mountpoint: &std::path::Path,
) -> Option<&'a std::path::Path> {
    let relative = path.strip_prefix(mountpoint).ok()?;
    if relative.is_absolute()
        || relative
            .components()
            .any(|component| component == std::path::Component::ParentDir)
    {
        return None;
    }
    Some(relative)
}

/// Rewrite `path` into an rclone remote identifier using the first remote whose mount point
/// contains it.
///
/// Remotes are checked in order, when mount points are nested the earlier remote wins even if
/// a later one is more specific. Paths outside of all mount points are returned unchanged.
/// Returns `None` when `path` is not valid UTF-8 and so can't be passed to rclone as is.
#[must_use]
pub fn resolve_path(path: &std::path::Path, remotes: &[Remote]) -> Option<PathType> {
    let path_str = path.to_str()?;
    for remote in remotes {
        if let Some(relative) = relative_to_mountpoint(path, &remote.mountpoint) {
            let relative = relative.to_str()?;
            let identifier = format!(
                "{}:{}/{}",
                remote.name,
                remote.bucket,
                relative.trim_start_matches('/')
            );
            let identifier = identifier.strip_suffix('/').unwrap_or(&identifier);
            return Some(PathType::Remote(identifier.to_string()));
        }
    }
    Some(PathType::Local(path_str.to_string()))
}
