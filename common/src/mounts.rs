//! Discovery of rclone mounts from the OS mount table

use anyhow::Context;

use crate::remotes::Remote;

/// Filesystem type marker carried by rclone mounts (e.g. `fuse.rclone`)
const REMOTE_FS_MARKER: &str = "rclone";

/// One row of the mount table, reduced to what discovery needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub fs_type: String,
    pub mountpoint: std::path::PathBuf,
}

/// Decode the `\NNN` octal escapes the kernel uses for space, tab, newline and backslash
fn unescape_octal(raw: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some((&byte, tail)) = rest.split_first() {
        match (byte, tail.get(..3).and_then(octal_byte)) {
            (b'\\', Some(escaped)) => {
                decoded.push(escaped);
                rest = &tail[3..];
            }
            _ => {
                decoded.push(byte);
                rest = tail;
            }
        }
    }
    decoded
}

fn octal_byte(digits: &[u8]) -> Option<u8> {
    let value = digits.iter().try_fold(0u32, |value, digit| match digit {
        b'0'..=b'7' => Some(value * 8 + u32::from(digit - b'0')),
        _ => None,
    })?;
    u8::try_from(value).ok()
}

impl From<procfs::process::MountInfo> for MountEntry {
    fn from(mount: procfs::process::MountInfo) -> Self {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};
        let source = unescape_octal(mount.mount_source.unwrap_or_default().as_bytes());
        let mountpoint = unescape_octal(mount.mount_point.as_os_str().as_bytes());
        Self {
            // a source that isn't UTF-8 can't name an rclone remote, left empty it is skipped
            source: String::from_utf8(source).unwrap_or_default(),
            fs_type: mount.fs_type,
            mountpoint: std::ffi::OsString::from_vec(mountpoint).into(),
        }
    }
}

/// Read the mount table of the current process from `/proc/self/mountinfo`
pub fn read_mount_table() -> anyhow::Result<Vec<MountEntry>> {
    let mounts = procfs::process::Process::myself()
        .and_then(|process| process.mountinfo())
        .context("failed reading /proc/self/mountinfo")?;
    Ok(mounts.into_iter().map(MountEntry::from).collect())
}

#[must_use]
pub fn is_remote_mount(fs_type: &str) -> bool {
    fs_type.contains(REMOTE_FS_MARKER)
}

/// Parse an rclone mount source of the form `name:bucket`.
///
/// rclone may decorate the remote name with a `{...}` suffix when the remote was
/// created on the fly (e.g. `s3{AbC12}:bucket`), only the part before `{` is kept.
/// Anything else that doesn't look like `name:bucket` yields `None`.
#[must_use]
pub fn parse_mount_entry(entry: &MountEntry) -> Option<Remote> {
    let parts: Vec<&str> = entry.source.split(':').collect();
    let [name, bucket] = parts.as_slice() else {
        return None;
    };
    let name_parts: Vec<&str> = name.split('{').collect();
    let name = match name_parts.as_slice() {
        [name] | [name, _] => *name,
        _ => return None,
    };
    if name.is_empty() || bucket.is_empty() {
        return None;
    }
    Some(Remote {
        name: name.to_string(),
        bucket: bucket.to_string(),
        mountpoint: entry.mountpoint.clone(),
    })
}

/// Keep rclone mounts that parse into a remote, in mount table order
pub fn discover_remote_mounts(entries: impl IntoIterator<Item = MountEntry>) -> Vec<Remote> {
    entries
        .into_iter()
        .filter(|entry| is_remote_mount(&entry.fs_type))
        .filter_map(|entry| {
            tracing::debug!("remote mountpoint {:?}", &entry.mountpoint);
            let remote = parse_mount_entry(&entry);
            if remote.is_none() {
                tracing::debug!("skipping unrecognized mount source {:?}", &entry.source);
            }
            remote
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn entry(source: &str, fs_type: &str, mountpoint: &str) -> MountEntry {
        MountEntry {
            source: source.to_string(),
            fs_type: fs_type.to_string(),
            mountpoint: mountpoint.into(),
        }
    }

    #[test]
    fn parses_name_and_bucket() {
        let remote = parse_mount_entry(&entry("s3:photos", "fuse.rclone", "/mnt/photos")).unwrap();
        assert_eq!(remote.name, "s3");
        assert_eq!(remote.bucket, "photos");
        assert_eq!(remote.mountpoint, std::path::PathBuf::from("/mnt/photos"));
    }

    #[test]
    fn strips_decorated_name() {
        let remote =
            parse_mount_entry(&entry("s3{AbC12}:photos", "fuse.rclone", "/mnt/photos")).unwrap();
        assert_eq!(remote.name, "s3");
        assert_eq!(remote.bucket, "photos");
    }

    #[test]
    fn rejects_malformed_sources() {
        for source in [
            "s3",
            "s3:photos:extra",
            "s3{a}{b}:photos",
            ":photos",
            "s3:",
            "",
        ] {
            assert_eq!(
                parse_mount_entry(&entry(source, "fuse.rclone", "/mnt/x")),
                None,
                "source {source:?} should be rejected"
            );
        }
    }

    #[traced_test]
    #[test]
    fn discovery_skips_foreign_and_malformed_mounts() {
        let entries = vec![
            entry("/dev/sda1", "ext4", "/"),
            entry("s3:photos", "fuse.rclone", "/mnt/photos"),
            entry("broken", "fuse.rclone", "/mnt/broken"),
            entry("proc", "proc", "/proc"),
            entry("gcs{x}:logs", "fuse.rclone", "/mnt/logs"),
        ];
        let remotes = discover_remote_mounts(entries);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[0].mountpoint, std::path::PathBuf::from("/mnt/photos"));
        assert_eq!(remotes[1].name, "gcs");
        assert_eq!(remotes[1].bucket, "logs");
        assert!(logs_contain("remote mountpoint"));
        assert!(logs_contain("skipping unrecognized mount source"));
    }

    #[test]
    fn decodes_escaped_mountinfo_fields() {
        let mount = procfs::process::MountInfo::from_line(
            r"36 35 0:40 / /mnt/my\040photos rw,relatime - fuse.rclone s3:photos\134raw rw",
        )
        .unwrap();
        let remotes = discover_remote_mounts([MountEntry::from(mount)]);
        assert_eq!(remotes.len(), 1);
        assert_eq!(
            remotes[0].mountpoint,
            std::path::PathBuf::from("/mnt/my photos")
        );
        assert_eq!(remotes[0].bucket, r"photos\raw");
    }

    #[test]
    fn unescape_leaves_plain_and_partial_escapes_alone() {
        assert_eq!(unescape_octal(br"/mnt/a\011b\012c"), b"/mnt/a\tb\nc");
        assert_eq!(unescape_octal(br"/mnt/x\04"), br"/mnt/x\04");
        assert_eq!(unescape_octal(br"/mnt/x\089"), br"/mnt/x\089");
        assert_eq!(unescape_octal(br"/mnt/x\777"), br"/mnt/x\777");
        assert_eq!(unescape_octal(b"/mnt/plain"), b"/mnt/plain");
    }

    #[test]
    fn reads_own_mount_table() {
        // every linux process sees at least the root mount
        let entries = read_mount_table().unwrap();
        assert!(!entries.is_empty());
    }
}
