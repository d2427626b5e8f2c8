pub mod config;

use crate::app::App;
use crate::cli::Command;
use crate::ui;
use anyhow::{Context, Result};
use archmaint_core::HealthGrade;
use archmaint_tasks::TaskReport;

/// Runs one command. `Ok(false)` means the workflow finished but some
/// step failed.
pub async fn run(app: &mut App, command: &Command) -> Result<bool> {
    let ui = app.ui();
    let maintainer = &app.maintainer;

    let ok = match command {
        Command::Status => {
            maintainer.status().await;
            true
        }
        Command::Update => summarize(maintainer.update().await.context("System update failed")?),
        Command::Clean => summarize(maintainer.clean().await.context("System cleanup failed")?),
        Command::Orphans => summarize(
            maintainer
                .remove_orphans()
                .await
                .context("Orphan removal failed")?,
        ),
        Command::Services => maintainer.services().await.failed == 0,
        Command::Logs => {
            maintainer.logs().await;
            true
        }
        Command::Health => maintainer.health_check().await.grade() != HealthGrade::Critical,
        Command::Maintenance => summarize(
            maintainer
                .full_maintenance()
                .await
                .context("Full maintenance failed")?,
        ),
        Command::Search { term } => {
            maintainer.search(term).await.context("Package search failed")?;
            true
        }
        Command::Backup => summarize(maintainer.backup().await.context("Backup failed")?),
        Command::Restore => summarize(maintainer.restore().await.context("Restore failed")?),
        Command::Snapshot => summarize(maintainer.snapshot().await.context("Snapshot failed")?),
        Command::Config => {
            config::manage(app).await?;
            true
        }
        Command::Version => {
            ui::show_version(ui.as_ref(), app.maintainer.policy()).await;
            true
        }
    };

    Ok(ok)
}

fn summarize(report: TaskReport) -> bool {
    match report.to_json() {
        Ok(json) => tracing::debug!("{} report: {}", report.workflow, json),
        Err(e) => tracing::warn!("Could not serialize {} report: {}", report.workflow, e),
    }
    !report.has_failures()
}
