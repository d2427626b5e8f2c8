use crate::command_executor::{CommandRunner, ExecutionRequest, ExecutionResult};
use archmaint_policy::SafetyPolicy;
use std::sync::Arc;

pub const DRY_RUN_MARKER: &str = "[dry-run] Would run:";

/// Front door for every command that changes the system.
///
/// With `dry_run` on, the wrapped runner is never reached and the command
/// line is handed back as output instead.
pub struct DryRunExecutor {
    runner: Arc<dyn CommandRunner>,
}

impl DryRunExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub async fn execute(&self, request: &ExecutionRequest, policy: &SafetyPolicy) -> ExecutionResult {
        if policy.dry_run {
            tracing::info!("Dry run, skipping: {}", request.command_line());
            return ExecutionResult::from_exit(0, describe(&request.argv).into_bytes(), Vec::new());
        }

        self.runner.run(request).await
    }
}

/// Human-readable rendering of a command that was not run.
pub fn describe(argv: &[String]) -> String {
    format!("{} {}\n", DRY_RUN_MARKER, argv.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
            self.calls.lock().unwrap().push(request.argv.clone());
            ExecutionResult::from_exit(2, b"real".to_vec(), Vec::new())
        }
    }

    #[tokio::test]
    async fn test_dry_run_never_reaches_runner() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = DryRunExecutor::new(runner.clone());
        let policy = SafetyPolicy {
            dry_run: true,
            ..Default::default()
        };

        let request = ExecutionRequest::streaming(["sudo", "paccache", "-rk3"], false);
        let result = executor.execute(&request, &policy).await;

        assert!(result.succeeded);
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout_text().contains("sudo paccache -rk3"));
        assert!(result.stdout_text().starts_with(DRY_RUN_MARKER));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_wins_over_every_other_switch() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = DryRunExecutor::new(runner.clone());
        let policy = SafetyPolicy {
            dry_run: true,
            safe_mode: true,
            auto_confirm: true,
            verbose: true,
        };
        let request = ExecutionRequest::captured(["sudo", "pacman", "-Rns", "--noconfirm", "foo"]);
        assert!(executor.execute(&request, &policy).await.succeeded);
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_mode_delegates_unmodified() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = DryRunExecutor::new(runner.clone());
        let request = ExecutionRequest::captured(["pacman", "-Qu"]);
        let result = executor.execute(&request, &SafetyPolicy::default()).await;

        assert_eq!(result.exit_code, 2);
        assert_eq!(result.stdout, b"real");
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec![vec!["pacman".to_string(), "-Qu".to_string()]]
        );
    }

    #[test]
    fn test_describe() {
        let argv = vec!["sudo".to_string(), "reboot".to_string()];
        assert_eq!(describe(&argv), "[dry-run] Would run: sudo reboot\n");
    }
}
