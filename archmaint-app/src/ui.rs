//! Banner, menu and help screens.

use archmaint_interfaces::Interface;
use archmaint_policy::SafetyPolicy;
use colored::Colorize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// (key, title, description) in display order.
pub const MENU: &[(&str, &str, &str)] = &[
    ("1", "System Status", "Show system information and status"),
    ("2", "System Update", "Update system packages (with backup)"),
    ("3", "System Clean", "Clean package cache and temporary files"),
    ("4", "Remove Orphans", "Remove orphaned packages"),
    ("5", "System Services", "View system services status"),
    ("6", "System Logs", "View recent system logs"),
    ("7", "Health Check", "Comprehensive system health check"),
    ("8", "Full Maintenance", "Run complete maintenance routine"),
    ("9", "Search Packages", "Search for packages"),
    ("10", "Create Backup", "Backup package list and important files"),
    ("11", "Create Snapshot", "Create system snapshot (btrfs)"),
    ("12", "Configuration", "Manage settings and preferences"),
    ("h", "Help", "Show help information"),
    ("0", "Exit", "Exit the application"),
];

const COMMANDS: &[(&str, &str)] = &[
    ("status, s", "Show system status and information"),
    ("update, u", "Update system packages (with backup)"),
    ("clean, c", "Clean system (cache, logs, temp files)"),
    ("orphans, o", "Remove orphaned packages"),
    ("services, sv", "Show system services status"),
    ("logs, l", "Show recent system logs"),
    ("health, h", "Run comprehensive health check"),
    ("maintenance, m", "Run full maintenance routine"),
    ("search, se <term>", "Search for packages"),
    ("backup, b", "Create system backup"),
    ("restore, r", "Restore from backup"),
    ("snapshot, sn", "Create btrfs snapshot"),
    ("config, cfg", "Manage configuration"),
    ("version, v", "Show version information"),
];

pub async fn banner(ui: &dyn Interface, policy: &SafetyPolicy) {
    let title = format!("ArchMaint · Arch Linux Maintenance Tool v{}", VERSION);
    ui.send_output(&"╔══════════════════════════════════════════════════════════════════╗".cyan().to_string())
        .await;
    ui.send_output(&format!("║  {:<64}║", title).cyan().bold().to_string())
        .await;
    ui.send_output(&"╚══════════════════════════════════════════════════════════════════╝".cyan().to_string())
        .await;

    if policy.dry_run {
        ui.send_output(&"  [DRY RUN MODE] No changes will be made".yellow().bold().to_string())
            .await;
    }
    if policy.safe_mode {
        ui.send_output(&"  [SAFE MODE] Extra confirmations enabled".green().bold().to_string())
            .await;
    }
    ui.send_output("").await;
}

pub async fn show_menu(ui: &dyn Interface) {
    for (key, title, description) in MENU {
        ui.send_output(&format!(
            "  {:>3}  {:<18} {}",
            key.bold(),
            title,
            description.dimmed()
        ))
        .await;
    }
}

pub async fn show_help(ui: &dyn Interface, policy: &SafetyPolicy) {
    banner(ui, policy).await;
    ui.send_output(&"USAGE:".bold().to_string()).await;
    ui.send_output("  archmaint [OPTIONS] [COMMAND]\n").await;
    ui.send_output(&"OPTIONS:".bold().to_string()).await;
    ui.send_output("  --dry-run          Show what would be done without making changes").await;
    ui.send_output("  --safe             Enable safe mode with extra confirmations").await;
    ui.send_output("  -y, --yes          Answer yes to non-dangerous confirmations").await;
    ui.send_output("  -v, --verbose      Stream command output").await;
    ui.send_output("  --no-color         Disable colored output").await;
    ui.send_output("  --config <PATH>    Use another config file\n").await;
    ui.send_output(&"COMMANDS:".bold().to_string()).await;
    for (name, description) in COMMANDS {
        ui.send_output(&format!("  {:<20} {}", name, description)).await;
    }
    ui.send_output(&"\nEXAMPLES:".bold().to_string()).await;
    ui.send_output("  archmaint status              # Show system status").await;
    ui.send_output("  archmaint --dry-run update    # Preview system updates").await;
    ui.send_output("  archmaint --safe clean        # Clean with extra safety").await;
    ui.send_output("  archmaint search firefox      # Search for firefox package").await;
    ui.send_output("  archmaint                     # Interactive mode").await;
}

pub async fn show_version(ui: &dyn Interface, policy: &SafetyPolicy) {
    banner(ui, policy).await;
    ui.send_output(&format!("Version: {}", VERSION)).await;
    ui.send_output("Built for Arch Linux").await;
}

/// `None` when input is closed or unreadable.
pub async fn read_line(ui: &dyn Interface) -> Option<String> {
    match ui.receive_input().await {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!("Failed to read input: {}", e);
            None
        }
    }
}

pub async fn wait_for_continue(ui: &dyn Interface) {
    ui.prompt("\nPress Enter to continue...").await;
    let _ = read_line(ui).await;
}
