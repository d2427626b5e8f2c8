use crate::parse;
use crate::types::*;
use archmaint_executor::{CommandRunner, DryRunExecutor, EnvironmentSnapshot, ExecutionRequest, ExecutionResult};
use archmaint_interfaces::Interface;
use archmaint_policy::{ConfirmationGate, SafetyPolicy};
use archmaint_tasks::catalog::names;
use archmaint_tasks::{Task, TaskKind, TaskRegistry, TaskReport, TaskStatus};
use colored::Colorize;
use std::sync::Arc;

/// Runs the maintenance workflows.
///
/// Every workflow goes registry, then confirmation gate, then dry-run
/// interceptor, then runner, one command at a time. Read-only queries
/// bypass the gate and the interceptor; anything that changes the system
/// goes through both.
pub struct Maintainer {
    pub(crate) policy: SafetyPolicy,
    pub(crate) settings: MaintainerSettings,
    pub(crate) registry: TaskRegistry,
    runner: Arc<dyn CommandRunner>,
    executor: DryRunExecutor,
    pub(crate) gate: ConfirmationGate,
    pub(crate) ui: Arc<dyn Interface>,
}

impl Maintainer {
    pub fn new(
        policy: SafetyPolicy,
        settings: MaintainerSettings,
        registry: TaskRegistry,
        runner: Arc<dyn CommandRunner>,
        ui: Arc<dyn Interface>,
    ) -> Self {
        Self {
            policy,
            settings,
            registry,
            executor: DryRunExecutor::new(runner.clone()),
            runner,
            gate: ConfirmationGate::new(ui.clone()),
            ui,
        }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut SafetyPolicy {
        &mut self.policy
    }

    pub fn settings(&self) -> &MaintainerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MaintainerSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Swap in a registry rebuilt from new retention settings.
    pub fn set_registry(&mut self, registry: TaskRegistry) {
        self.registry = registry;
    }

    pub fn interface(&self) -> &Arc<dyn Interface> {
        &self.ui
    }

    pub(crate) async fn say(&self, message: impl AsRef<str>) {
        self.ui.send_output(message.as_ref()).await;
    }

    pub(crate) async fn heading(&self, title: &str) {
        self.say(format!("\n=== {} ===", title.to_uppercase()).cyan().bold().to_string())
            .await;
        let modes = self.policy.active_modes();
        if !modes.is_empty() {
            self.say(format!("[{}]", modes.join(" | ")).yellow().to_string())
                .await;
        }
    }

    /// Prints up to `list_limit` items and summarizes the rest.
    pub(crate) async fn print_list(&self, items: &[String]) {
        for item in items.iter().take(self.settings.list_limit) {
            self.say(format!("  • {}", item)).await;
        }
        if items.len() > self.settings.list_limit {
            self.say(format!("  ... and {} more", items.len() - self.settings.list_limit))
                .await;
        }
    }

    /// Read-only command with captured output. Runs even in dry-run mode.
    pub async fn query<I, S>(&self, argv: I) -> ExecutionResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(&ExecutionRequest::captured(argv)).await
    }

    /// Command that changes the system; dry-run mode intercepts it.
    async fn apply(&self, argv: Vec<String>) -> ExecutionResult {
        let request = ExecutionRequest::streaming(argv, self.policy.verbose);
        self.executor.execute(&request, &self.policy).await
    }

    /// Gate, then run. `confirm` overrides the default "Run <name>?" prompt.
    pub async fn run_task(
        &self,
        task: &Task,
        extra: &[String],
        confirm: Option<&str>,
        report: &mut TaskReport,
    ) -> TaskStatus {
        let message = confirm
            .map(str::to_string)
            .unwrap_or_else(|| format!("Run {}?", task.name));

        let decision = self.gate.decide(&message, task.dangerous, &self.policy).await;
        if !decision.is_approved() {
            tracing::info!("{} declined ({:?})", task.name, decision);
            self.say(format!("Skipped: {}", task.name).dimmed().to_string())
                .await;
            report.record(&task.name, TaskStatus::Declined, None, None);
            return TaskStatus::Declined;
        }

        self.execute_task(task, extra, report).await
    }

    /// Run without asking; the caller has already confirmed.
    pub(crate) async fn execute_task(
        &self,
        task: &Task,
        extra: &[String],
        report: &mut TaskReport,
    ) -> TaskStatus {
        let argv = task.command_with(extra.iter().cloned());
        let result = self.apply(argv).await;

        if self.policy.dry_run {
            self.say(result.stdout_text().trim_end().yellow().to_string())
                .await;
            report.record(&task.name, TaskStatus::Simulated, Some(0), None);
            return TaskStatus::Simulated;
        }

        if result.succeeded {
            self.say(format!("✅ {} completed", task.name).green().to_string())
                .await;
            report.record(&task.name, TaskStatus::Completed, Some(0), None);
            TaskStatus::Completed
        } else {
            let detail = result
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("exit code {}", result.exit_code));
            tracing::warn!("{} failed: {}", task.name, detail);
            self.say(format!("❌ {} failed: {}", task.name, detail).red().to_string())
                .await;
            report.record(&task.name, TaskStatus::Failed, Some(result.exit_code), Some(detail));
            TaskStatus::Failed
        }
    }

    async fn count_of(&self, argv: &[&str]) -> Option<usize> {
        let result = self.query(argv.iter().copied()).await;
        if result.is_spawn_failure() {
            return None;
        }
        Some(parse::count_lines(&result.stdout_text()))
    }

    pub async fn package_counts(&self) -> PackageCounts {
        PackageCounts {
            installed: self.count_of(&["pacman", "-Q"]).await,
            explicit: self.count_of(&["pacman", "-Qe"]).await,
            orphans: self.count_of(&["pacman", "-Qtdq"]).await,
            updates: self.count_of(&["pacman", "-Qu"]).await,
        }
    }

    pub async fn status(&self) -> SystemStatus {
        self.heading("System Status").await;

        let rows = EnvironmentSnapshot::capture().rows();
        for (label, value) in &rows {
            self.say(format!("{} {}", format!("{:<17}", format!("{}:", label)).bold(), value))
                .await;
        }

        let packages = self.package_counts().await;
        let show = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string());
        self.say("\nPackages:".bold().to_string()).await;
        self.say(format!("  Installed:        {}", show(packages.installed))).await;
        self.say(format!("  Explicit:         {}", show(packages.explicit))).await;
        self.say(format!("  Orphaned:         {}", show(packages.orphans))).await;
        match packages.updates {
            Some(0) => self.say(format!("  Updates:          {}", "up to date".green())).await,
            Some(n) => {
                self.say(format!("  Updates:          {}", format!("{} available", n).yellow()))
                    .await
            }
            None => self.say("  Updates:          N/A").await,
        }

        let df = self
            .query(["df", "-h", "-x", "tmpfs", "-x", "devtmpfs"])
            .await;
        let disks = parse::disk_health(&df.stdout_text());
        self.say("\nDisk Health:".bold().to_string()).await;
        for disk in &disks {
            let line = format!("  {:<20} {}%", disk.mount, disk.use_percent);
            let line = match disk.level {
                DiskLevel::Critical => format!("{} CRITICAL", line).red().to_string(),
                DiskLevel::Warning => format!("{} WARNING", line).yellow().to_string(),
                DiskLevel::Ok => format!("{} OK", line).green().to_string(),
            };
            self.say(line).await;
        }

        SystemStatus {
            rows,
            packages,
            disks,
        }
    }

    pub async fn update(&self) -> Result<TaskReport, WorkflowError> {
        self.update_inner(true).await
    }

    pub(crate) async fn update_inner(&self, offer_backup: bool) -> Result<TaskReport, WorkflowError> {
        self.heading("System Update").await;
        let mut report = TaskReport::new("update");

        if offer_backup
            && self.settings.backup_enabled
            && !self.policy.dry_run
            && self
                .gate
                .confirm("Create a backup before updating?", false, &self.policy)
                .await
        {
            report.merge(self.backup().await?);
        }

        if !self
            .gate
            .confirm("This will update your system. Continue?", false, &self.policy)
            .await
        {
            self.say("Update cancelled.").await;
            report.record(names::UPGRADE_PACKAGES, TaskStatus::Declined, None, None);
            return Ok(report);
        }

        self.say("Synchronizing package databases...".blue().to_string())
            .await;
        let sync = self.registry.get(names::SYNC_DATABASES)?;
        if self.execute_task(sync, &[], &mut report).await == TaskStatus::Failed {
            return Ok(report);
        }

        let updates = self.query(["pacman", "-Qu"]).await.stdout_lines();
        if updates.is_empty() {
            self.say("✅ System is up to date!".green().to_string()).await;
            report.record(
                names::UPGRADE_PACKAGES,
                TaskStatus::Skipped,
                None,
                Some("no pending updates".to_string()),
            );
            return Ok(report);
        }

        self.say(format!("{} packages can be updated:", updates.len()).yellow().to_string())
            .await;
        self.print_list(&updates).await;

        let upgrade = self.registry.get(names::UPGRADE_PACKAGES)?;
        let prompt = format!("Proceed with updating {} packages?", updates.len());
        let status = self.run_task(upgrade, &[], Some(&prompt), &mut report).await;

        if status == TaskStatus::Completed && self.needs_reboot().await {
            self.say("⚠️  Kernel updated. A reboot is recommended.".yellow().to_string())
                .await;
        }

        Ok(report)
    }

    pub async fn clean(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("System Cleanup").await;
        let mut report = TaskReport::new("clean");

        for task in self.registry.of_kind(TaskKind::Clean) {
            self.say(format!("\n{} ({})", task.name.bold(), task.frequency))
                .await;
            self.say(format!("  Description: {}", task.description)).await;
            if task.dangerous {
                self.say("  ⚠️  Caution: this operation can remove data".yellow().to_string())
                    .await;
            }
            let prompt = format!("Run {} cleanup?", task.name);
            self.run_task(task, &[], Some(&prompt), &mut report).await;
        }

        self.say(format!(
            "\nCleanup finished: {} completed, {} simulated, {} skipped, {} failed",
            report.count(TaskStatus::Completed),
            report.count(TaskStatus::Simulated),
            report.count(TaskStatus::Declined),
            report.count(TaskStatus::Failed),
        ))
        .await;

        Ok(report)
    }

    pub async fn remove_orphans(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("Orphaned Packages").await;
        let mut report = TaskReport::new("orphans");

        let orphans = self.query(["pacman", "-Qtdq"]).await.stdout_lines();
        if orphans.is_empty() {
            self.say("✅ No orphaned packages found!".green().to_string())
                .await;
            report.record(names::REMOVE_ORPHANS, TaskStatus::Skipped, None, None);
            return Ok(report);
        }

        self.say(format!("Found {} orphaned packages:", orphans.len()).yellow().to_string())
            .await;
        self.print_list(&orphans).await;

        let task = self.registry.get(names::REMOVE_ORPHANS)?;
        let prompt = format!("Remove these {} orphaned packages?", orphans.len());
        self.run_task(task, &orphans, Some(&prompt), &mut report).await;

        Ok(report)
    }

    pub async fn services(&self) -> ServiceSummary {
        self.heading("Service Status").await;

        self.say("Failed services:".bold().to_string()).await;
        let failed = self.query(["systemctl", "--failed", "--no-pager"]).await;
        for line in failed.stdout_text().lines() {
            self.say(line).await;
        }

        let units = self
            .query(["systemctl", "list-units", "--type=service", "--all", "--no-pager"])
            .await;
        let summary = parse::summarize_services(&units.stdout_text());

        self.say("\nService Summary:".bold().to_string()).await;
        self.say(format!("  Active:   {}", summary.active.to_string().green()))
            .await;
        self.say(format!("  Failed:   {}", summary.failed.to_string().red()))
            .await;
        self.say(format!("  Inactive: {}", summary.inactive)).await;

        summary
    }

    pub async fn logs(&self) {
        self.heading("System Logs").await;

        self.say("Errors since today:".bold().to_string()).await;
        let errors = self
            .query(["journalctl", "-p", "3", "-x", "--no-pager", "--since", "today", "-n", "50"])
            .await;
        self.relay(&errors, "No errors logged today.").await;

        self.say("\nCurrent boot (last 20 entries):".bold().to_string())
            .await;
        let boot = self.query(["journalctl", "-b", "--no-pager", "-n", "20"]).await;
        self.relay(&boot, "No entries.").await;
    }

    async fn relay(&self, result: &ExecutionResult, empty: &str) {
        let text = result.stdout_text();
        if text.trim().is_empty() {
            self.say(empty.green().to_string()).await;
            return;
        }
        for line in text.lines() {
            self.say(line).await;
        }
    }

    pub async fn full_maintenance(&self) -> Result<TaskReport, WorkflowError> {
        self.heading("Full System Maintenance").await;
        self.say("This will run: backup, update, clean, orphan removal, health check")
            .await;

        let mut report = TaskReport::new("maintenance");
        if !self
            .gate
            .confirm("Start full system maintenance?", true, &self.policy)
            .await
        {
            self.say("Maintenance cancelled.").await;
            report.record("Full Maintenance", TaskStatus::Declined, None, None);
            return Ok(report);
        }

        if self.settings.backup_enabled {
            report.merge(self.backup().await?);
        }
        report.merge(self.update_inner(false).await?);
        report.merge(self.clean().await?);
        report.merge(self.remove_orphans().await?);
        let health = self.health_check().await;

        self.say(format!(
            "\nMaintenance finished: {} steps completed, {} failed, health score {}%",
            report.count(TaskStatus::Completed),
            report.count(TaskStatus::Failed),
            health.score(),
        ))
        .await;

        if self.needs_reboot().await {
            self.say("⚠️  The running kernel differs from the installed one.".yellow().to_string())
                .await;
            let reboot = self.registry.get(names::REBOOT)?;
            self.run_task(reboot, &[], Some("Reboot now?"), &mut report).await;
        }

        Ok(report)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<PackageHit>, WorkflowError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "search term must not be empty".to_string(),
            ));
        }

        self.heading(&format!("Package Search: {}", term)).await;
        let result = self.query(["pacman", "-Ss", "--", term]).await;
        let hits = parse::search_hits(&result.stdout_text());

        if hits.is_empty() {
            self.say(format!("No packages found matching '{}'", term)).await;
            return Ok(hits);
        }

        for hit in hits.iter().take(self.settings.list_limit) {
            let mut line = format!("{} {}", hit.name.bold(), hit.version.green());
            if hit.installed {
                line.push_str(&format!(" {}", "[installed]".cyan()));
            }
            self.say(line).await;
            if !hit.description.is_empty() {
                self.say(format!("    {}", hit.description)).await;
            }
        }
        if hits.len() > self.settings.list_limit {
            self.say(format!(
                "... and {} more results",
                hits.len() - self.settings.list_limit
            ))
            .await;
        }

        let info = self.query(["pacman", "-Qi", "--", term]).await;
        if info.succeeded {
            self.say("\nInstalled package details:".bold().to_string())
                .await;
            for line in info.stdout_text().lines() {
                self.say(line).await;
            }
        }

        Ok(hits)
    }

    /// True when `uname -r` and the installed `linux` package disagree.
    /// Any query failure reads as "no reboot needed".
    pub async fn needs_reboot(&self) -> bool {
        let running = self.query(["uname", "-r"]).await;
        let installed = self.query(["pacman", "-Q", "linux"]).await;
        if !running.succeeded || !installed.succeeded {
            return false;
        }

        let running = running.stdout_text();
        let installed = installed.stdout_text();
        match parse::installed_version(&installed) {
            Some(version) if !running.trim().is_empty() => !parse::same_kernel(&running, version),
            _ => false,
        }
    }
}
