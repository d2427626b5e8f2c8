use crate::{Frequency, Task, TaskKind};
use std::path::PathBuf;

/// Task names used by the workflows.
pub mod names {
    pub const SYNC_DATABASES: &str = "Sync Databases";
    pub const UPGRADE_PACKAGES: &str = "Upgrade Packages";
    pub const PACKAGE_CACHE: &str = "Package Cache";
    pub const UNINSTALLED_CACHE: &str = "Uninstalled Package Cache";
    pub const SYSTEM_LOGS: &str = "System Logs";
    pub const TEMPORARY_FILES: &str = "Temporary Files";
    pub const USER_CACHE: &str = "User Cache";
    pub const REMOVE_ORPHANS: &str = "Remove Orphans";
    pub const RESTORE_PACKAGES: &str = "Restore Packages";
    pub const PREPARE_SNAPSHOTS: &str = "Prepare Snapshot Directory";
    pub const CREATE_SNAPSHOT: &str = "Create Snapshot";
    pub const REBOOT: &str = "Reboot";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    pub cache_retention_days: u32,
    pub log_retention_days: u32,
    /// Prepended to every privileged command, e.g. `["sudo"]`.
    pub escalation: Vec<String>,
    pub user_cache_dir: PathBuf,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            cache_retention_days: 30,
            log_retention_days: 7,
            escalation: vec!["sudo".to_string()],
            user_cache_dir: PathBuf::from("~/.cache"),
        }
    }
}

impl RegistrySettings {
    fn privileged(&self, argv: &[&str]) -> Vec<String> {
        self.escalation
            .iter()
            .cloned()
            .chain(argv.iter().map(|s| s.to_string()))
            .collect()
    }
}

/// One package list written by the backup workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupItem {
    pub name: &'static str,
    pub command: &'static [&'static str],
    pub file: &'static str,
    /// pacman exits 1 when the query matches nothing; an empty list is
    /// still a valid backup for this item.
    pub empty_ok: bool,
}

pub const BACKUP_ITEMS: &[BackupItem] = &[
    BackupItem {
        name: "Package list (explicitly installed)",
        command: &["pacman", "-Qqe"],
        file: "packages_explicit.txt",
        empty_ok: false,
    },
    BackupItem {
        name: "Package list (all installed)",
        command: &["pacman", "-Qq"],
        file: "packages_all.txt",
        empty_ok: false,
    },
    BackupItem {
        name: "Package list (foreign/AUR)",
        command: &["pacman", "-Qqm"],
        file: "packages_foreign.txt",
        empty_ok: true,
    },
];

pub(crate) fn builtin_tasks(settings: &RegistrySettings) -> Vec<Task> {
    let task = |name: &str, description: String, command: Vec<String>, dangerous, frequency, kind| Task {
        name: name.to_string(),
        description,
        command,
        dangerous,
        frequency,
        kind,
    };

    vec![
        task(
            names::SYNC_DATABASES,
            "Synchronize package databases".to_string(),
            settings.privileged(&["pacman", "-Sy"]),
            false,
            Frequency::Daily,
            TaskKind::Update,
        ),
        task(
            names::UPGRADE_PACKAGES,
            "Upgrade all installed packages".to_string(),
            settings.privileged(&["pacman", "-Su", "--noconfirm"]),
            false,
            Frequency::Weekly,
            TaskKind::Update,
        ),
        task(
            names::PACKAGE_CACHE,
            "Clean pacman cache (keep the 3 most recent versions)".to_string(),
            settings.privileged(&["paccache", "-rk3"]),
            false,
            Frequency::Weekly,
            TaskKind::Clean,
        ),
        task(
            names::UNINSTALLED_CACHE,
            "Remove cache for uninstalled packages".to_string(),
            settings.privileged(&["paccache", "-ruk0"]),
            false,
            Frequency::Weekly,
            TaskKind::Clean,
        ),
        task(
            names::SYSTEM_LOGS,
            format!(
                "Clean old journal logs (keep {} days)",
                settings.log_retention_days
            ),
            settings.privileged(&[
                "journalctl",
                &format!("--vacuum-time={}d", settings.log_retention_days),
            ]),
            false,
            Frequency::Weekly,
            TaskKind::Clean,
        ),
        task(
            names::TEMPORARY_FILES,
            "Clean /tmp and /var/tmp (older than 7 days)".to_string(),
            settings.privileged(&[
                "find", "/tmp", "/var/tmp", "-type", "f", "-atime", "+7", "-delete",
            ]),
            false,
            Frequency::Daily,
            TaskKind::Clean,
        ),
        task(
            names::USER_CACHE,
            format!(
                "Clean user cache files not accessed for {} days",
                settings.cache_retention_days
            ),
            vec![
                "find".to_string(),
                settings.user_cache_dir.to_string_lossy().to_string(),
                "-type".to_string(),
                "f".to_string(),
                "-atime".to_string(),
                format!("+{}", settings.cache_retention_days),
                "-delete".to_string(),
            ],
            false,
            Frequency::Monthly,
            TaskKind::Clean,
        ),
        task(
            names::REMOVE_ORPHANS,
            "Remove packages no longer required by anything".to_string(),
            settings.privileged(&["pacman", "-Rns", "--noconfirm"]),
            true,
            Frequency::Monthly,
            TaskKind::Orphans,
        ),
        task(
            names::RESTORE_PACKAGES,
            "Reinstall explicitly installed packages from a backup".to_string(),
            settings.privileged(&["pacman", "-S", "--needed", "--noconfirm"]),
            true,
            Frequency::Monthly,
            TaskKind::Restore,
        ),
        task(
            names::PREPARE_SNAPSHOTS,
            "Create the /.snapshots directory".to_string(),
            settings.privileged(&["mkdir", "-p", "/.snapshots"]),
            false,
            Frequency::Weekly,
            TaskKind::Snapshot,
        ),
        task(
            names::CREATE_SNAPSHOT,
            "Snapshot the root btrfs subvolume".to_string(),
            settings.privileged(&["btrfs", "subvolume", "snapshot", "/"]),
            false,
            Frequency::Weekly,
            TaskKind::Snapshot,
        ),
        task(
            names::REBOOT,
            "Reboot the machine".to_string(),
            settings.privileged(&["reboot"]),
            true,
            Frequency::Monthly,
            TaskKind::Power,
        ),
    ]
}
