use crate::engine::Maintainer;
use crate::parse;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Checks must stay below this percentage to pass.
pub const USAGE_LIMIT_PERCENT: u64 = 90;
/// Fewer error-priority journal lines than this today counts as healthy.
pub const ERROR_LINE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl HealthCheck {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthGrade {
    Healthy,
    Warning,
    Critical,
}

impl HealthGrade {
    pub fn for_score(score: u32) -> Self {
        match score {
            100 => HealthGrade::Healthy,
            80..=99 => HealthGrade::Warning,
            _ => HealthGrade::Critical,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// passed * 100 / total, rounded down.
    pub fn score(&self) -> u32 {
        if self.checks.is_empty() {
            return 0;
        }
        (self.passed() * 100 / self.checks.len()) as u32
    }

    pub fn grade(&self) -> HealthGrade {
        HealthGrade::for_score(self.score())
    }
}

impl Maintainer {
    pub async fn health_check(&self) -> HealthReport {
        self.heading("System Health Check").await;

        let checks = vec![
            self.check_disk().await,
            self.check_memory().await,
            self.check_failed_services().await,
            self.check_package_database().await,
            self.check_system_errors().await,
            self.check_security_updates().await,
        ];

        for check in &checks {
            let line = format!("{}: {}", check.name, check.detail);
            if check.passed {
                self.say(format!("✅ {}", line).green().to_string()).await;
            } else {
                self.say(format!("❌ {}", line).red().to_string()).await;
            }
        }

        let report = HealthReport { checks };
        let summary = format!(
            "\nHealth score: {}% ({}/{} checks passed)",
            report.score(),
            report.passed(),
            report.checks.len()
        );
        let summary = match report.grade() {
            HealthGrade::Healthy => summary.green(),
            HealthGrade::Warning => summary.yellow(),
            HealthGrade::Critical => summary.red(),
        };
        self.say(summary.to_string()).await;

        report
    }

    async fn check_disk(&self) -> HealthCheck {
        let df = self.query(["df", "-h", "/"]).await;
        match parse::df_use_percent(&df.stdout_text()) {
            Some(percent) => HealthCheck::new(
                "Disk space",
                u64::from(percent) < USAGE_LIMIT_PERCENT,
                format!("root filesystem {}% used", percent),
            ),
            None => HealthCheck::new("Disk space", false, "could not read disk usage"),
        }
    }

    async fn check_memory(&self) -> HealthCheck {
        let free = self.query(["free"]).await;
        match parse::free_memory(&free.stdout_text()) {
            Some((total, used)) if total > 0 => {
                let percent = used * 100 / total;
                HealthCheck::new(
                    "Memory",
                    percent < USAGE_LIMIT_PERCENT,
                    format!("{}% used", percent),
                )
            }
            _ => HealthCheck::new("Memory", false, "could not read memory usage"),
        }
    }

    async fn check_failed_services(&self) -> HealthCheck {
        let result = self.query(["systemctl", "--failed", "--no-legend"]).await;
        if result.is_spawn_failure() {
            return HealthCheck::new("Failed services", false, "systemctl unavailable");
        }
        let failed = result.stdout_lines().len();
        HealthCheck::new(
            "Failed services",
            failed == 0,
            format!("{} failed units", failed),
        )
    }

    async fn check_package_database(&self) -> HealthCheck {
        let result = self.query(["pacman", "-Dk"]).await;
        let detail = if result.succeeded {
            "consistent"
        } else {
            "inconsistencies found"
        };
        HealthCheck::new("Package database", result.succeeded, detail)
    }

    async fn check_system_errors(&self) -> HealthCheck {
        let result = self
            .query(["journalctl", "-p", "3", "--since", "today", "--no-pager"])
            .await;
        if result.is_spawn_failure() {
            return HealthCheck::new("System errors", false, "journalctl unavailable");
        }
        let errors = parse::count_lines(&result.stdout_text());
        HealthCheck::new(
            "System errors",
            errors < ERROR_LINE_LIMIT,
            format!("{} error lines today", errors),
        )
    }

    async fn check_security_updates(&self) -> HealthCheck {
        let result = self.query(["pacman", "-Qu"]).await;
        if result.is_spawn_failure() {
            return HealthCheck::new("Security updates", false, "could not list pending updates");
        }
        let pending = result.stdout_text();
        let critical = parse::critical_updates(&pending);
        if critical.is_empty() {
            HealthCheck::new("Security updates", true, "no critical updates pending")
        } else {
            HealthCheck::new(
                "Security updates",
                false,
                format!("pending: {}", critical.join(", ")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaintainerSettings;
    use archmaint_executor::ScriptedRunner;
    use archmaint_interfaces::ScriptedInterface;
    use archmaint_policy::SafetyPolicy;
    use archmaint_tasks::{RegistrySettings, TaskRegistry};
    use std::sync::Arc;

    const DF_OK: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/nvme0n1p2  468G  200G  245G  45% /
";

    const FREE_OK: &str = "\
               total        used        free      shared  buff/cache   available
Mem:        16000000     4000000     9000000      400000     3000000    11000000
";

    fn healthy_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .respond("df -h /", 0, DF_OK)
            .respond("free", 0, FREE_OK)
            .respond("systemctl --failed --no-legend", 0, "")
            .respond("pacman -Dk", 0, "No database errors have been found!\n")
            .respond("journalctl -p 3 --since today --no-pager", 0, "-- No entries --\n")
            .respond("pacman -Qu", 0, "firefox 120 -> 121\n")
    }

    async fn run(runner: ScriptedRunner) -> HealthReport {
        let m = Maintainer::new(
            SafetyPolicy::default(),
            MaintainerSettings::default(),
            TaskRegistry::builtin(&RegistrySettings::default()),
            Arc::new(runner),
            Arc::new(ScriptedInterface::new(Vec::<String>::new())),
        );
        m.health_check().await
    }

    #[tokio::test]
    async fn test_all_checks_pass() {
        let report = run(healthy_runner()).await;
        assert_eq!(report.checks.len(), 6);
        assert_eq!(report.score(), 100);
        assert_eq!(report.grade(), HealthGrade::Healthy);
    }

    #[tokio::test]
    async fn test_ninety_percent_disk_fails() {
        let df = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/nvme0n1p2  468G  421G   47G  90% /
";
        let report = run(healthy_runner().respond("df -h /", 0, df)).await;
        assert!(!report.checks[0].passed);
        assert_eq!(report.score(), 83);
        assert_eq!(report.grade(), HealthGrade::Warning);
    }

    #[tokio::test]
    async fn test_critical_package_update_fails_security_check() {
        let report = run(healthy_runner().respond("pacman -Qu", 0, "openssl 3.1 -> 3.2\n")).await;
        let security = report.checks.last().unwrap();
        assert!(!security.passed);
        assert!(security.detail.contains("openssl"));
    }

    #[tokio::test]
    async fn test_failures_lower_grade() {
        let errors: String = (0..7).map(|i| format!("error {}\n", i)).collect();
        let report = run(
            healthy_runner()
                .respond("pacman -Dk", 1, "")
                .respond("systemctl --failed --no-legend", 0, "cups.service loaded failed failed CUPS\n")
                .respond("journalctl -p 3 --since today --no-pager", 0, &errors),
        )
        .await;
        assert_eq!(report.passed(), 3);
        assert_eq!(report.score(), 50);
        assert_eq!(report.grade(), HealthGrade::Critical);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(HealthGrade::for_score(100), HealthGrade::Healthy);
        assert_eq!(HealthGrade::for_score(80), HealthGrade::Warning);
        assert_eq!(HealthGrade::for_score(79), HealthGrade::Critical);
        assert_eq!(HealthReport::default().score(), 0);
    }
}
