use crate::engine::Maintainer;
use crate::types::{BackupEntry, WorkflowError};
use archmaint_executor::{human_bytes, ExecutionResult};
use archmaint_tasks::catalog::names;
use archmaint_tasks::{BackupItem, TaskReport, TaskStatus, BACKUP_ITEMS};
use chrono::{DateTime, Local};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Directory name of a backup, and suffix of a snapshot name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const SNAPSHOT_ROOT: &str = "/.snapshots";
pub const SNAPSHOT_PREFIX: &str = "archmaint_";
const RECENT: usize = 5;

/// Backup directories under `root`, newest first. A missing root is empty.
pub async fn list_backups(root: &Path) -> Result<Vec<BackupEntry>, WorkflowError> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_dir() {
            continue;
        }
        backups.push(BackupEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }

    backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    Ok(backups)
}

async fn directory_size(dir: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        total += entry.metadata().await?.len();
    }
    Ok(total)
}

fn backup_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg:<40} [{bar:30.green}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// A list is usable when its query succeeded, or when the item allows an
/// empty result and pacman reported "nothing matched".
fn list_captured(item: &BackupItem, result: &ExecutionResult) -> bool {
    result.succeeded || (item.empty_ok && result.exit_code == 1 && result.stdout.is_empty())
}

impl Maintainer {
    /// Writes the package lists into a fresh timestamped directory, one
    /// report record per list. Dry-run mode only describes the lists.
    pub async fn backup(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("Backup").await;
        let mut report = TaskReport::new("backup");

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let dir = self.settings.backup_path.join(&stamp);

        if self.policy.dry_run {
            self.say(format!("[dry-run] Would create {}", dir.display()).yellow().to_string())
                .await;
            for item in BACKUP_ITEMS {
                self.say(format!("  Would backup: {} -> {}", item.name, item.file))
                    .await;
                report.record(item.name, TaskStatus::Simulated, None, None);
            }
            return Ok(report);
        }

        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!("Creating backup in {}", dir.display());

        let bar = backup_bar(BACKUP_ITEMS.len());
        let mut missing = Vec::new();
        for item in BACKUP_ITEMS {
            bar.set_message(item.name);
            let result = self.query(item.command.iter().copied()).await;
            if list_captured(item, &result) {
                let file = dir.join(item.file);
                tokio::fs::write(&file, &result.stdout).await?;
                if self.policy.verbose {
                    bar.println(format!("  Backed up: {}", item.name));
                }
                report.record(
                    item.name,
                    TaskStatus::Completed,
                    Some(result.exit_code),
                    Some(file.display().to_string()),
                );
            } else {
                let detail = result
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| format!("exit code {}", result.exit_code));
                tracing::warn!("Skipping {}: {}", item.name, detail);
                report.record(item.name, TaskStatus::Failed, Some(result.exit_code), Some(detail));
                missing.push(item.name);
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if missing.is_empty() {
            self.say(format!("✅ Backup created: {}", dir.display()).green().to_string())
                .await;
        } else {
            for name in &missing {
                self.say(format!("❌ Could not back up {}", name).red().to_string())
                    .await;
            }
            self.say(format!("⚠️  Backup incomplete: {}", dir.display()).yellow().to_string())
                .await;
        }
        let size = directory_size(&dir).await?;
        self.say(format!("  Backup size: {}", human_bytes(size))).await;

        self.show_recent_backups().await?;
        Ok(report)
    }

    async fn show_recent_backups(&self) -> Result<(), WorkflowError> {
        let backups = list_backups(&self.settings.backup_path).await?;
        if backups.is_empty() {
            return Ok(());
        }
        self.say("\nRecent backups:").await;
        for backup in backups.iter().take(RECENT) {
            self.say(format!("  - {} ({})", backup.name, format_modified(backup)))
                .await;
        }
        Ok(())
    }

    /// Reinstalls the explicitly installed packages recorded in a backup
    /// the operator picks by number.
    pub async fn restore(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("Restore Backup").await;
        let mut report = TaskReport::new("restore");

        let backups = list_backups(&self.settings.backup_path).await?;
        if backups.is_empty() {
            self.say("No backups found!".red().to_string()).await;
            report.record(names::RESTORE_PACKAGES, TaskStatus::Skipped, None, None);
            return Ok(report);
        }

        self.say("Available backups:").await;
        for (idx, backup) in backups.iter().enumerate() {
            self.say(format!("  {}. {} ({})", idx + 1, backup.name, format_modified(backup)))
                .await;
        }

        self.ui.prompt("\nSelect backup to restore (0 to cancel): ").await;
        let choice = match self.ui.receive_input().await {
            Ok(Some(line)) => line.trim().parse::<usize>().ok(),
            _ => None,
        };
        let Some(selected) = choice
            .filter(|n| (1..=backups.len()).contains(n))
            .map(|n| &backups[n - 1])
        else {
            self.say("Restore cancelled.").await;
            report.record(names::RESTORE_PACKAGES, TaskStatus::Declined, None, None);
            return Ok(report);
        };

        let list = selected.path.join("packages_explicit.txt");
        let contents = match tokio::fs::read_to_string(&list).await {
            Ok(contents) => contents,
            Err(e) => {
                self.say(format!("❌ Cannot read {}: {}", list.display(), e).red().to_string())
                    .await;
                report.record(names::RESTORE_PACKAGES, TaskStatus::Failed, None, Some(e.to_string()));
                return Ok(report);
            }
        };

        let packages: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if packages.is_empty() {
            self.say("The selected backup lists no packages.").await;
            report.record(names::RESTORE_PACKAGES, TaskStatus::Skipped, None, None);
            return Ok(report);
        }

        self.say("\nWARNING: This will install packages from the backup!".red().bold().to_string())
            .await;
        self.say(format!("Restoring {} packages from {}", packages.len(), selected.name))
            .await;

        let task = self.registry.get(names::RESTORE_PACKAGES)?;
        self.run_task(task, &packages, Some("Continue with restore?"), &mut report)
            .await;

        Ok(report)
    }

    /// Read-only btrfs snapshot of `/` under `/.snapshots`.
    pub async fn snapshot(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("Create System Snapshot").await;
        let mut report = TaskReport::new("snapshot");

        let fstype = self.query(["findmnt", "-n", "-o", "FSTYPE", "/"]).await;
        if !fstype.succeeded || !fstype.stdout_text().contains("btrfs") {
            self.say("Root filesystem is not btrfs".yellow().to_string()).await;
            self.say("Snapshots are only supported on btrfs filesystems.").await;
            self.say("Consider using Timeshift or Snapper for advanced snapshot management.")
                .await;
            report.record(names::CREATE_SNAPSHOT, TaskStatus::Skipped, None, None);
            return Ok(report);
        }

        let target = format!(
            "{}/{}{}",
            SNAPSHOT_ROOT,
            SNAPSHOT_PREFIX,
            Local::now().format(TIMESTAMP_FORMAT)
        );

        let create = self.registry.get(names::CREATE_SNAPSHOT)?;
        let prompt = format!("Create snapshot {}?", target);
        if !self.gate.confirm(&prompt, create.dangerous, &self.policy).await {
            self.say("Snapshot cancelled.").await;
            report.record(names::CREATE_SNAPSHOT, TaskStatus::Declined, None, None);
            return Ok(report);
        }

        let prepare = self.registry.get(names::PREPARE_SNAPSHOTS)?;
        if self.execute_task(prepare, &[], &mut report).await == TaskStatus::Failed {
            return Ok(report);
        }
        let status = self
            .execute_task(create, std::slice::from_ref(&target), &mut report)
            .await;

        if status == TaskStatus::Completed {
            self.show_recent_snapshots().await;
        }
        Ok(report)
    }

    async fn show_recent_snapshots(&self) {
        let argv: Vec<String> = self
            .settings
            .escalation
            .iter()
            .cloned()
            .chain(["btrfs", "subvolume", "list", "/"].map(String::from))
            .collect();
        let result = self.query(argv).await;
        if !result.succeeded {
            return;
        }

        let lines = result.stdout_lines();
        let recent: Vec<&String> = lines
            .iter()
            .rev()
            .filter(|l| l.contains(SNAPSHOT_PREFIX))
            .take(RECENT)
            .collect();
        if recent.is_empty() {
            return;
        }
        self.say("\nRecent snapshots:").await;
        for line in recent {
            self.say(format!("  - {}", line)).await;
        }
    }
}

fn format_modified(backup: &BackupEntry) -> String {
    backup
        .modified
        .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
