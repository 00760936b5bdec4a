use tracing::instrument;

use crate::path;
use common::{Prompter, Remote, Transfer, TransferConfig};

const UPLOAD_PROMPT: &str =
    "Uploading will not be immediately visible in the file system; Would you like to continue?";

/// Reasons a copy is refused or fails, each of them ends the whole run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("stat {path}: {source}")]
    Stat {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Nothing to do as '{src}' and '{dst}' are the same")]
    SameSourceAndDestination { src: String, dst: String },
    #[error("Recommended to use the 'cp' command")]
    NotRemote,
    #[error("Abort")]
    Declined,
    #[error(transparent)]
    Prompt(anyhow::Error),
    #[error("'{path}' is not a valid UTF-8 path")]
    NonUtf8Path { path: String },
    #[error("'{path}' is a file, not a directory.")]
    NotADirectory { path: String },
    #[error("cannot overwrite non-directory '{dst}' with directory '{src}'")]
    OverwriteNonDirectory { src: String, dst: String },
    #[error("cannot overwrite directory '{dst}' with file '{src}'")]
    OverwriteDirectory { src: String, dst: String },
    #[error("failed creating directory {path}: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0:#}")]
    Transfer(anyhow::Error),
    #[error("transfer of '{src}' to '{dst}' failed: {status}")]
    TransferFailed {
        src: String,
        dst: String,
        status: std::process::ExitStatus,
    },
}

/// Source and destination as handed to `rclone copyto`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub src: String,
    pub dst: String,
}

impl CopyPlan {
    #[must_use]
    pub fn args(&self, parallel: usize) -> Vec<String> {
        common::transfer::copyto_args(&self.src, &self.dst, parallel)
    }
}

/// `metadata` that tells "doesn't exist" apart from real failures
async fn metadata_if_exists(path: &std::path::Path) -> std::io::Result<Option<std::fs::Metadata>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}

/// Validate a single copy and work out the rclone source and destination.
///
/// `src` and `dst` are the arguments exactly as given by the user, a trailing separator on
/// either of them means "this is a directory". `dst_abs` is the absolute form of `dst`,
/// computed once for all sources.
///
/// Uploads (destination under a mount point) must be confirmed through `prompter`. When the
/// destination doesn't exist but was given with a trailing separator it is created as a
/// directory, this happens only after the confirmation.
#[instrument(skip(remotes, prompter))]
pub async fn prepare<P: Prompter>(
    src: &str,
    dst: &str,
    dst_abs: &std::path::Path,
    remotes: &[Remote],
    prompter: &P,
) -> Result<CopyPlan, Error> {
    let src_abs = path::absolute_path(src).map_err(|source| Error::Stat {
        path: src.to_string(),
        source,
    })?;
    if src_abs == dst_abs {
        return Err(Error::SameSourceAndDestination {
            src: src.to_string(),
            dst: dst.to_string(),
        });
    }
    let src_type = path::resolve_path(&src_abs, remotes).ok_or_else(|| Error::NonUtf8Path {
        path: src_abs.display().to_string(),
    })?;
    let dst_type = path::resolve_path(dst_abs, remotes).ok_or_else(|| Error::NonUtf8Path {
        path: dst_abs.display().to_string(),
    })?;
    if !src_type.is_remote() && !dst_type.is_remote() {
        return Err(Error::NotRemote);
    }
    if dst_type.is_remote() && !prompter.confirm(UPLOAD_PROMPT).map_err(Error::Prompt)? {
        return Err(Error::Declined);
    }
    let mut src_id = src_type.identifier().to_string();
    let mut dst_id = dst_type.identifier().to_string();
    let src_metadata = tokio::fs::metadata(&src_abs)
        .await
        .map_err(|source| Error::Stat {
            path: src.to_string(),
            source,
        })?;
    if src_metadata.is_dir() {
        src_id.push('/');
    } else if path::ends_with_separator(src) {
        return Err(Error::NotADirectory {
            path: src.to_string(),
        });
    }
    let dst_metadata = metadata_if_exists(dst_abs)
        .await
        .map_err(|source| Error::Stat {
            path: dst.to_string(),
            source,
        })?;
    let dst_is_dir = match dst_metadata {
        None => {
            if path::ends_with_separator(dst) {
                tracing::debug!("creating destination directory {:?}", dst_abs);
                tokio::fs::create_dir_all(dst_abs)
                    .await
                    .map_err(|source| Error::CreateDirectory {
                        path: dst.to_string(),
                        source,
                    })?;
                true
            } else {
                false
            }
        }
        Some(dst_metadata) => {
            if !dst_metadata.is_dir() && src_metadata.is_dir() {
                return Err(Error::OverwriteNonDirectory {
                    src: src.to_string(),
                    dst: dst.to_string(),
                });
            }
            if !dst_metadata.is_dir() && path::ends_with_separator(dst) {
                return Err(Error::NotADirectory {
                    path: dst.to_string(),
                });
            }
            dst_metadata.is_dir()
        }
    };
    if dst_is_dir {
        dst_id.push('/');
        if !src_metadata.is_dir() {
            let file_name = src_abs.file_name().ok_or_else(|| Error::NotADirectory {
                path: src.to_string(),
            })?;
            let dst_file = dst_abs.join(file_name);
            let existing = metadata_if_exists(&dst_file).await.ok().flatten();
            if existing.is_some_and(|metadata| metadata.is_dir()) {
                return Err(Error::OverwriteDirectory {
                    src: src.to_string(),
                    dst: dst_file.display().to_string(),
                });
            }
            let file_name = file_name.to_str().ok_or_else(|| Error::NonUtf8Path {
                path: src.to_string(),
            })?;
            dst_id.push_str(file_name);
        }
    }
    tracing::debug!("'{}' => '{}'", &src_id, &dst_id);
    Ok(CopyPlan {
        src: src_id,
        dst: dst_id,
    })
}

/// Copy `src` to `dst` through the transfer program, see [`prepare`] for the argument semantics
#[instrument(skip(remotes, settings, prompter, transfer))]
pub async fn copy<P: Prompter, T: Transfer>(
    src: &str,
    dst: &str,
    dst_abs: &std::path::Path,
    remotes: &[Remote],
    settings: &TransferConfig,
    prompter: &P,
    transfer: &T,
) -> Result<CopyPlan, Error> {
    let plan = prepare(src, dst, dst_abs, remotes, prompter).await?;
    let status = transfer
        .run(&plan.args(settings.parallel))
        .await
        .map_err(Error::Transfer)?;
    if !status.success() {
        return Err(Error::TransferFailed {
            src: plan.src,
            dst: plan.dst,
            status,
        });
    }
    tracing::info!("copied '{}' to '{}'", &plan.src, &plan.dst);
    Ok(plan)
}
