use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Task error: {0}")]
    Task(#[from] archmaint_tasks::TaskError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintainerSettings {
    pub backup_enabled: bool,
    pub backup_path: PathBuf,
    /// Prefix for privileged read-only queries such as `btrfs subvolume list`.
    pub escalation: Vec<String>,
    /// How many entries of a long listing are printed before summarizing.
    pub list_limit: usize,
}

impl Default for MaintainerSettings {
    fn default() -> Self {
        Self {
            backup_enabled: true,
            backup_path: PathBuf::from(".archmaint/backups"),
            escalation: vec!["sudo".to_string()],
            list_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCounts {
    pub installed: Option<usize>,
    pub explicit: Option<usize>,
    pub orphans: Option<usize>,
    pub updates: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskLevel {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskHealth {
    pub mount: String,
    pub use_percent: u32,
    pub level: DiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub active: usize,
    pub failed: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageHit {
    /// `repo/name`
    pub name: String,
    pub version: String,
    pub installed: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<chrono::DateTime<chrono::Local>>,
}

#[derive(Debug, Clone, Default)]
pub struct SystemStatus {
    pub rows: Vec<(&'static str, String)>,
    pub packages: PackageCounts,
    pub disks: Vec<DiskHealth>,
}
