use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use super::{Cli, Commands};
use crate::cli_cmds::*;

pub(crate) async fn run() -> Result<()> {
    let Cli {
        command,
        resources,
        output,
        transition,
        config,
        verbose,
    } = Cli::parse();

    init_tracing(verbose);

    let host = HostOptions {
        resources,
        output,
        transition,
        config,
    };

    match command {
        Commands::List { local } => {
            cmd_list(&host, local).await?;
        }
        Commands::Download { selector } => {
            cmd_download(&host, &selector).await?;
        }
        Commands::Apply { selector } => {
            cmd_apply(&host, &selector).await?;
        }
        Commands::Config { action } => {
            cmd_config(&host, action)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
