use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linguarr")]
#[command(author, version, about = "Language track auditing for Sonarr/Radarr libraries")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit all enabled catalogs and remediate failing items
    Check {
        /// Show what would be done without deleting or downloading anything
        #[arg(long)]
        dry_run: bool,

        /// Review failing items interactively instead of auto-replacing them
        #[arg(short, long)]
        interactive: bool,

        /// Only audit the named catalog
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Probe a single media file and display its audio/subtitle streams
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file and test catalog connections
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Inspect or clear the on-disk caches
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show entry counts for each store
    Stats,

    /// Clear a store, or a single entry of it
    Clear {
        /// Which store to clear
        store: CacheStore,

        /// Remove only the entry with this key
        #[arg(long)]
        entry: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheStore {
    /// Cached ffprobe stream inventories
    Probe,
    /// Files already verified as passing
    Passed,
    /// Remembered skip decisions
    Skipped,
}
