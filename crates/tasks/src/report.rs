use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Failed,
    /// The operator declined the confirmation.
    Declined,
    /// Nothing to do, e.g. no orphans found.
    Skipped,
    /// Described only, because dry-run mode was on.
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
    pub exit_code: Option<i32>,
    pub detail: Option<String>,
    pub finished_at: i64,
}

/// Outcome of each step of one workflow run, in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskReport {
    pub workflow: String,
    pub records: Vec<TaskRecord>,
}

impl TaskReport {
    pub fn new(workflow: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            records: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        name: impl Into<String>,
        status: TaskStatus,
        exit_code: Option<i32>,
        detail: Option<String>,
    ) {
        let name = name.into();
        tracing::debug!("{}: {} -> {:?}", self.workflow, name, status);
        self.records.push(TaskRecord {
            name,
            status,
            exit_code,
            detail,
            finished_at: chrono::Utc::now().timestamp(),
        });
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(TaskStatus::Failed) > 0
    }

    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        self.records
            .iter()
            .rev()
            .find(|r| r.name == name)
            .map(|r| r.status)
    }

    pub fn merge(&mut self, other: TaskReport) {
        self.records.extend(other.records);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_lookup() {
        let mut report = TaskReport::new("clean");
        report.record("Package Cache", TaskStatus::Completed, Some(0), None);
        report.record("System Logs", TaskStatus::Failed, Some(1), Some("exit 1".into()));
        report.record("User Cache", TaskStatus::Declined, None, None);

        assert_eq!(report.count(TaskStatus::Completed), 1);
        assert!(report.has_failures());
        assert_eq!(report.status_of("User Cache"), Some(TaskStatus::Declined));
        assert_eq!(report.status_of("Temporary Files"), None);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = TaskReport::new("maintenance");
        first.record("a", TaskStatus::Completed, Some(0), None);
        let mut second = TaskReport::new("clean");
        second.record("b", TaskStatus::Simulated, Some(0), None);
        first.merge(second);

        let names: Vec<_> = first.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(first.to_json().unwrap().contains("Simulated"));
    }
}
