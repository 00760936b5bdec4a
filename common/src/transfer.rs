//! Invocation of the external transfer program

use anyhow::Context;

/// Runs the external transfer program and reports how it exited
pub trait Transfer {
    fn run(
        &self,
        args: &[String],
    ) -> impl std::future::Future<Output = anyhow::Result<std::process::ExitStatus>>;
}

/// Arguments for copying a single item from `src` to `dst`
#[must_use]
pub fn copyto_args(src: &str, dst: &str, parallel: usize) -> Vec<String> {
    vec![
        "copyto".to_string(),
        src.to_string(),
        dst.to_string(),
        format!("--transfers={parallel}"),
        format!("--checkers={parallel}"),
        "-P".to_string(),
    ]
}

/// The real rclone binary, sharing our stdout and stderr
#[derive(Debug, Clone)]
pub struct Rclone {
    pub program: std::path::PathBuf,
}

impl Rclone {
    #[must_use]
    pub fn new(program: std::path::PathBuf) -> Self {
        Self { program }
    }
}

impl Transfer for Rclone {
    async fn run(&self, args: &[String]) -> anyhow::Result<std::process::ExitStatus> {
        tracing::debug!("running {:?} {:?}", &self.program, args);
        let mut child = tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(std::process::Stdio::inherit())
            .stdout(std::process::Stdio::inherit())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to launch {}", self.program.display()))?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("failed waiting for {}", self.program.display()))?;
        tracing::debug!("{} finished with {}", self.program.display(), status);
        Ok(status)
    }
}
