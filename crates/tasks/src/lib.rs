pub mod catalog;
pub mod report;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use catalog::{BackupItem, RegistrySettings, BACKUP_ITEMS};
pub use report::{TaskRecord, TaskReport, TaskStatus};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),
    #[error("Task already exists: {0}")]
    AlreadyExists(String),
    #[error("Task has an empty command: {0}")]
    EmptyCommand(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "Daily"),
            Frequency::Weekly => write!(f, "Weekly"),
            Frequency::Monthly => write!(f, "Monthly"),
        }
    }
}

/// Which workflow a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskKind {
    Update,
    Clean,
    Orphans,
    Restore,
    Snapshot,
    Power,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub command: Vec<String>,
    pub dangerous: bool,
    pub frequency: Frequency,
    pub kind: TaskKind,
}

impl Task {
    /// The task's command followed by `extra` arguments, e.g. package names.
    pub fn command_with<I, S>(&self, extra: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into))
            .collect()
    }
}

/// Ordered, read-only catalog of maintenance tasks.
///
/// Built once at startup. Workflows run tasks in registry order; the
/// registry itself does not sequence anything.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<Task>) -> Result<Self, TaskError> {
        for (idx, task) in tasks.iter().enumerate() {
            if task.command.is_empty() {
                return Err(TaskError::EmptyCommand(task.name.clone()));
            }
            if tasks[..idx].iter().any(|t| t.name == task.name) {
                return Err(TaskError::AlreadyExists(task.name.clone()));
            }
        }
        Ok(Self { tasks })
    }

    pub fn builtin(settings: &RegistrySettings) -> Self {
        Self {
            tasks: catalog::builtin_tasks(settings),
        }
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&Task, TaskError> {
        self.find(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))
    }

    pub fn of_kind(&self, kind: TaskKind) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, command: &[&str]) -> Task {
        Task {
            name: name.to_string(),
            description: String::new(),
            command: command.iter().map(|s| s.to_string()).collect(),
            dangerous: false,
            frequency: Frequency::Weekly,
            kind: TaskKind::Clean,
        }
    }

    #[test]
    fn test_registry_preserves_order() {
        let registry = TaskRegistry::new(vec![
            task("b", &["true"]),
            task("a", &["true"]),
            task("c", &["true"]),
        ])
        .unwrap();
        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_find_and_get() {
        let registry = TaskRegistry::new(vec![task("Package Cache", &["true"])]).unwrap();
        assert!(registry.find("Package Cache").is_some());
        assert!(registry.find("package cache").is_none());
        assert!(matches!(registry.get("missing"), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_commands() {
        let dup = TaskRegistry::new(vec![task("x", &["true"]), task("x", &["false"])]);
        assert!(matches!(dup, Err(TaskError::AlreadyExists(_))));

        let empty = TaskRegistry::new(vec![task("y", &[])]);
        assert!(matches!(empty, Err(TaskError::EmptyCommand(_))));
    }

    #[test]
    fn test_command_with_extra_arguments() {
        let t = task("Remove Orphans", &["sudo", "pacman", "-Rns"]);
        assert_eq!(
            t.command_with(["foo", "bar"]),
            vec!["sudo", "pacman", "-Rns", "foo", "bar"]
        );
    }

    #[test]
    fn test_frequency_display() {
        assert_eq!(Frequency::Daily.to_string(), "Daily");
        assert_eq!(Frequency::Monthly.to_string(), "Monthly");
    }
}
