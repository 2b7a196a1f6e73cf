use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wallshelf")]
#[command(version)]
#[command(about = "Browse, download and apply theme wallpapers")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Directory of bundled wallpapers, laid out as {dir}/{package}/drawable/
    #[arg(short, long, global = true)]
    pub(crate) resources: Option<PathBuf>,

    /// Output to set the wallpaper on (all outputs when omitted)
    #[arg(short, long, global = true)]
    pub(crate) output: Option<String>,

    /// Transition used when applying (fade, wipe, grow, center, outer, none)
    #[arg(short, long, global = true, default_value = "fade")]
    pub(crate) transition: String,

    /// Settings file to use instead of the per-user one
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Fetch and list every wallpaper, bundled first
    List {
        /// Skip the remote manifest
        #[arg(short, long)]
        local: bool,
    },
    /// Download a remote wallpaper into the save location
    Download {
        /// 1-based index from `list`, title, or relative path
        selector: String,
    },
    /// Set a wallpaper as the desktop background
    Apply {
        /// 1-based index from `list`, title, or relative path
        selector: String,
    },
    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
