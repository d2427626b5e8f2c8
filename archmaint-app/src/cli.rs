use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archmaint", version, about = "Arch Linux maintenance tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show what would be done without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Require typing 'yes' before dangerous operations
    #[arg(long, global = true)]
    pub safe: bool,

    /// Answer yes to non-dangerous confirmations
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Stream command output and log more
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (default: ~/.config/archmaint/config.conf)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show system status and information
    #[command(visible_alias = "s")]
    Status,
    /// Update system packages (with backup)
    #[command(visible_alias = "u")]
    Update,
    /// Clean system (cache, logs, temp files)
    #[command(visible_alias = "c")]
    Clean,
    /// Remove orphaned packages
    #[command(visible_alias = "o")]
    Orphans,
    /// Show system services status
    #[command(visible_alias = "sv")]
    Services,
    /// Show recent system logs
    #[command(visible_alias = "l")]
    Logs,
    /// Run comprehensive health check
    #[command(visible_alias = "h")]
    Health,
    /// Run full maintenance routine
    #[command(visible_alias = "m")]
    Maintenance,
    /// Search for packages
    #[command(visible_alias = "se")]
    Search { term: String },
    /// Create system backup
    #[command(visible_alias = "b")]
    Backup,
    /// Restore from backup
    #[command(visible_alias = "r")]
    Restore,
    /// Create btrfs snapshot
    #[command(visible_alias = "sn")]
    Snapshot,
    /// Manage configuration
    #[command(visible_alias = "cfg")]
    Config,
    /// Show version information
    #[command(visible_alias = "v")]
    Version,
}

impl Cli {
    /// Flags only switch modes on; the file decides otherwise.
    pub fn apply(&self, config: &mut AppConfig) {
        config.dry_run |= self.dry_run;
        config.safe_mode |= self.safe;
        config.auto_confirm |= self.yes;
        config.verbose_mode |= self.verbose;
    }
}
