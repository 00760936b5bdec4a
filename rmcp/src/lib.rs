//! Copy between local paths and rclone mounts - `rmcp`
//!
//! rclone can mount a remote bucket as a local filesystem, but copying through such a mount
//! is slow and uploads don't show up in the mount until its cache refreshes. `rmcp` takes
//! paths that point into a mount, rewrites them into rclone remote identifiers and lets
//! `rclone copyto` do the transfer directly:
//!
//! ```bash
//! # /mnt/photos is `rclone mount s3:photos /mnt/photos`
//!
//! # download a directory into a new local directory
//! rmcp /mnt/photos/2024 ./backup/
//! # -> rclone copyto s3:photos/2024/ /home/me/backup/ --transfers=6 --checkers=6 -P
//!
//! # upload a file into an existing directory of the bucket
//! rmcp ./report.pdf /mnt/photos/docs
//! # -> rclone copyto /home/me/report.pdf s3:photos/docs/report.pdf --transfers=6 --checkers=6 -P
//! ```
//!
//! At least one side of every copy must be inside a mount, local to local copies are refused
//! (use `cp`). Uploads ask for confirmation first.
//!
//! # Remotes
//!
//! Mounts are found in the OS mount table (filesystem type containing `rclone`, mount source
//! `name:bucket`). Remotes can also be listed in a configuration file, by default
//! `<config dir>/rmcp/rmcp.yaml`:
//!
//! ```yaml
//! remotes:
//! - name: s3
//!   bucket: photos
//!   mountpoint: /mnt/photos
//! ```
//!
//! Configured remotes take precedence over discovered ones. `rmcp --save` writes the current
//! set of remotes to the configuration file.
//!
//! # Copy semantics
//!
//! - A directory source copies the directory contents (rclone `src/` convention).
//! - A destination with a trailing slash is a directory, it is created if missing.
//! - A file copied to an existing directory keeps its name inside it.
//! - Copies that would replace a directory with a file, or a file with a directory, are refused.
//!
//! Every failure ends the whole run, sources are processed in order, one at a time.

pub mod copy;
pub mod path;
