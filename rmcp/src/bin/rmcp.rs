use anyhow::anyhow;
use clap::Parser;
use tracing::instrument;

use rmcp_tools_rmcp::{copy, path};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rmcp",
    version,
    about = "Copy SOURCE to DEST where either side may live inside an rclone mount",
    long_about = "`rmcp` copies files to and from rclone mounts by handing the transfer to `rclone copyto`.

Paths inside a mounted remote are rewritten into rclone remote identifiers (`name:bucket/path`),
so data moves directly between the remote and the local disk instead of through the mount.

EXAMPLES:
    # Download a directory from a mounted bucket into a new local directory
    rmcp /mnt/photos/2024 ./backup/

    # Upload several files into a directory of the bucket
    rmcp a.txt b.txt /mnt/photos/docs/

    # Remember the currently mounted remotes in the configuration file
    rmcp --save"
)]
struct Args {
    // Transfer options
    /// The number of file transfers to run in parallel (1-12)
    #[arg(
        long,
        default_value_t = common::config::DEFAULT_PARALLEL,
        value_name = "N",
        help_heading = "Transfer options"
    )]
    parallel: usize,

    /// rclone executable used for the transfer
    #[arg(
        long,
        default_value = "rclone",
        value_name = "PATH",
        help_heading = "Transfer options"
    )]
    rclone: std::path::PathBuf,

    // Remotes
    /// Save currently known remotes to the configuration file and exit
    #[arg(long, help_heading = "Remotes")]
    save: bool,

    /// Configuration file listing remotes (default: rmcp/rmcp.yaml in the user config directory)
    #[arg(long, value_name = "PATH", help_heading = "Remotes")]
    config: Option<std::path::PathBuf>,

    // Progress & output
    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: WARN)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    // ARGUMENTS
    /// Source path(s) and destination path
    #[arg()]
    paths: Vec<String>, // must be strings to allow for parsing trailing slash
}

#[instrument]
async fn async_main(args: Args) -> anyhow::Result<()> {
    let settings = common::TransferConfig::new(args.parallel, args.rclone.clone())?;
    let remotes = common::remotes::load_registry(args.config.as_deref())?;
    if args.save {
        let config_path = args
            .config
            .clone()
            .or_else(common::remotes::default_config_path)
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        common::RemotesConfig::from_registry(&remotes).save(&config_path)?;
        println!("Saved {} remote(s) to {}", remotes.len(), config_path.display());
        return Ok(());
    }
    if args.paths.len() < 2 {
        return Err(anyhow!(
            "rmcp requires at least one SOURCE and a DEST, e.g. `rmcp SOURCE DEST`"
        ));
    }
    if remotes.is_empty() {
        return Err(copy::Error::NotRemote.into());
    }
    let Some((dst, sources)) = args.paths.split_last() else {
        return Err(anyhow!("missing destination"));
    };
    let dst_abs = path::absolute_path(dst).map_err(|err| anyhow!("stat {dst}: {err}"))?;
    let prompter = common::TerminalPrompter;
    let transfer = common::Rclone::new(settings.rclone.clone());
    for src in sources {
        copy::copy(
            src, dst, &dst_abs, &remotes, &settings, &prompter, &transfer,
        )
        .await?;
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    let output = common::OutputConfig {
        verbose: args.verbose,
    };
    let res = common::run(output, func);
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
