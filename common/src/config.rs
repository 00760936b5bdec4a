//! Configuration types for a single `rmcp` invocation

/// Lowest accepted number of parallel transfers
pub const MIN_PARALLEL: usize = 1;
/// Highest accepted number of parallel transfers
pub const MAX_PARALLEL: usize = 12;
/// Number of parallel transfers used when none is requested
pub const DEFAULT_PARALLEL: usize = 6;

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Verbosity level: 0=WARN, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub fn level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Settings handed to the external transfer program
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Applied to both `--transfers` and `--checkers`
    pub parallel: usize,
    /// Program invoked for every copy
    pub rclone: std::path::PathBuf,
}

impl TransferConfig {
    /// Validate the requested parallelism and build the configuration
    pub fn new(parallel: usize, rclone: std::path::PathBuf) -> anyhow::Result<Self> {
        if parallel > MAX_PARALLEL {
            return Err(anyhow::anyhow!(
                "The maximum number of parallel transfers is {MAX_PARALLEL}."
            ));
        }
        if parallel < MIN_PARALLEL {
            return Err(anyhow::anyhow!(
                "The minimum number of parallel transfers is {MIN_PARALLEL}."
            ));
        }
        Ok(Self { parallel, rclone })
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            rclone: std::path::PathBuf::from("rclone"),
        }
    }
}
