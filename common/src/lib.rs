//! Common library for `rmcp` - shared plumbing behind the copy front end
//!
//! This crate knows about rclone remotes and how they show up on the local machine, but
//! nothing about copy semantics:
//!
//! - [`remotes`]: the remote records, the persisted configuration file and registry assembly
//! - [`mounts`]: discovery of rclone FUSE mounts from the OS mount table
//! - [`transfer`]: invocation of the external transfer program
//! - [`prompt`]: interactive yes/no confirmation
//! - [`config`]: run configuration built once from command-line arguments
//!
//! [`run`] installs logging, drives an async entry point to completion and reports errors.

pub mod config;
pub mod mounts;
pub mod prompt;
pub mod remotes;
pub mod transfer;

pub use config::{OutputConfig, TransferConfig};
pub use prompt::{Prompter, TerminalPrompter};
pub use remotes::{Remote, RemotesConfig};
pub use transfer::{Rclone, Transfer};

fn init_tracing(output: &OutputConfig) {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(
            tracing_subscriber::filter::LevelFilter::from_level(output.level()).into(),
        )
        .from_env_lossy();
    // a subscriber may already be installed (e.g. by tests), keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run `func` to completion on a single-threaded runtime.
///
/// Returns `None` if anything failed, in which case the error was already printed to stderr.
pub fn run<Fut, Summary>(output: OutputConfig, func: impl FnOnce() -> Fut) -> Option<Summary>
where
    Fut: std::future::Future<Output = anyhow::Result<Summary>>,
{
    init_tracing(&output);
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start runtime: {error:#}");
            return None;
        }
    };
    match runtime.block_on(func()) {
        Ok(summary) => Some(summary),
        Err(error) => {
            tracing::debug!("{:?}", &error);
            eprintln!("{error:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_returns_result_of_entry_point() {
        let value = run(OutputConfig::default(), || async { Ok(7) });
        assert_eq!(value, Some(7));
    }

    #[test]
    fn run_reports_failure_as_none() {
        let value: Option<()> = run(OutputConfig::default(), || async {
            Err(anyhow::anyhow!("boom"))
        });
        assert_eq!(value, None);
    }
}
