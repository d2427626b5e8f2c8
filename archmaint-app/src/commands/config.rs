use crate::app::App;
use crate::config::parse_days;
use crate::ui;
use anyhow::Result;
use archmaint_interfaces::Interface;
use colored::Colorize;

async fn show_settings(app: &App, ui: &dyn Interface) {
    let policy = app.maintainer.policy();
    let config = &app.config;
    ui.send_output("Current Configuration:").await;
    ui.send_output(&format!("  Dry Run Mode:     {}", policy.dry_run)).await;
    ui.send_output(&format!("  Safe Mode:        {}", policy.safe_mode)).await;
    ui.send_output(&format!("  Auto Confirm:     {}", policy.auto_confirm)).await;
    ui.send_output(&format!("  Backup Enabled:   {}", config.backup_enabled)).await;
    ui.send_output(&format!("  Backup Path:      {}", config.backup_path.display()))
        .await;
    ui.send_output(&format!("  Cache Retention:  {} days", config.cache_retention_days))
        .await;
    ui.send_output(&format!("  Log Retention:    {} days", config.log_retention_days))
        .await;
    ui.send_output(&format!("  Notifications:    {}", config.notifications_enabled))
        .await;
    ui.send_output(&format!("  Verbose Mode:     {}", policy.verbose)).await;
}

async fn show_options(ui: &dyn Interface) {
    ui.send_output("\nConfiguration Options:").await;
    for line in [
        "  1. Toggle Dry Run Mode",
        "  2. Toggle Safe Mode",
        "  3. Toggle Backup",
        "  4. Set Cache Retention",
        "  5. Set Log Retention",
        "  6. Toggle Verbose Mode",
        "  7. Export Configuration",
        "  0. Back",
    ] {
        ui.send_output(line).await;
    }
}

async fn ask_days(ui: &dyn Interface, prompt: &str) -> Option<u32> {
    ui.prompt(prompt).await;
    let input = ui::read_line(ui).await?;
    let days = parse_days(&input);
    if days.is_none() {
        ui.send_output(&"Retention must be a positive number of days.".red().to_string())
            .await;
    }
    days
}

/// Interactive settings editor. Returns on `0` or closed input.
pub async fn manage(app: &mut App) -> Result<()> {
    let ui = app.ui();
    let ui = ui.as_ref();

    loop {
        ui.send_output(&"\n=== CONFIGURATION MANAGER ===".cyan().bold().to_string())
            .await;
        show_settings(app, ui).await;
        show_options(ui).await;
        ui.prompt("\nSelect option: ").await;

        let Some(choice) = ui::read_line(ui).await else {
            return Ok(());
        };

        let message = match choice.trim() {
            "1" => {
                let on = app.maintainer.policy_mut().toggle_dry_run();
                format!("Dry Run Mode: {}", on)
            }
            "2" => {
                let on = app.maintainer.policy_mut().toggle_safe_mode();
                format!("Safe Mode: {}", on)
            }
            "3" => {
                app.config.backup_enabled = !app.config.backup_enabled;
                app.maintainer.settings_mut().backup_enabled = app.config.backup_enabled;
                format!("Backup Enabled: {}", app.config.backup_enabled)
            }
            "4" => match ask_days(ui, "Enter cache retention days (default 30): ").await {
                Some(days) => {
                    app.config.cache_retention_days = days;
                    app.config.set_policy(app.maintainer.policy());
                    app.sync();
                    format!("Cache retention set to {} days", days)
                }
                None => continue,
            },
            "5" => match ask_days(ui, "Enter log retention days (default 7): ").await {
                Some(days) => {
                    app.config.log_retention_days = days;
                    app.config.set_policy(app.maintainer.policy());
                    app.sync();
                    format!("Log retention set to {} days", days)
                }
                None => continue,
            },
            "6" => {
                let on = app.maintainer.policy_mut().toggle_verbose();
                format!("Verbose Mode: {}", on)
            }
            "7" => {
                app.config.set_policy(app.maintainer.policy());
                match app.config.save(&app.config_path) {
                    Ok(()) => format!("Configuration exported to: {}", app.config_path.display()),
                    Err(e) => {
                        tracing::warn!("Config export failed: {}", e);
                        ui.send_output(
                            &format!("Failed to export configuration: {}", e).red().to_string(),
                        )
                        .await;
                        continue;
                    }
                }
            }
            "0" => return Ok(()),
            other => {
                ui.send_output(&format!("Invalid option: {}", other).red().to_string())
                    .await;
                continue;
            }
        };

        app.config.set_policy(app.maintainer.policy());
        ui.send_output(&message.green().to_string()).await;
    }
}
