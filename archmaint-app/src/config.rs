use archmaint_core::MaintainerSettings;
use archmaint_policy::SafetyPolicy;
use archmaint_tasks::RegistrySettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected KEY=VALUE, found '{text}'")]
    Syntax { line: usize, text: String },
    #[error("line {line}: invalid value '{value}' for {key}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
    #[error("Invalid configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Settings persisted in `~/.config/archmaint/config.conf`.
///
/// The file is plain `KEY=VALUE` lines; keys are the field names in
/// upper snake case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    pub dry_run: bool,
    pub safe_mode: bool,
    pub auto_confirm: bool,
    pub backup_enabled: bool,
    pub backup_path: PathBuf,
    pub cache_retention_days: u32,
    pub log_retention_days: u32,
    pub notifications_enabled: bool,
    pub verbose_mode: bool,
    #[serde(skip)]
    pub escalation: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            safe_mode: false,
            auto_confirm: false,
            backup_enabled: true,
            backup_path: home().join(".archmaint/backups"),
            cache_retention_days: 30,
            log_retention_days: 7,
            notifications_enabled: true,
            verbose_mode: false,
            escalation: vec!["sudo".to_string()],
        }
    }
}

enum ValueKind {
    Flag,
    Days,
    Path,
}

fn kind_of(key: &str) -> Option<ValueKind> {
    match key {
        "DRY_RUN" | "SAFE_MODE" | "AUTO_CONFIRM" | "BACKUP_ENABLED" | "NOTIFICATIONS_ENABLED"
        | "VERBOSE_MODE" => Some(ValueKind::Flag),
        "CACHE_RETENTION_DAYS" | "LOG_RETENTION_DAYS" => Some(ValueKind::Days),
        "BACKUP_PATH" => Some(ValueKind::Path),
        _ => None,
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `~/x` and `~` expand to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix('~') {
        Some("") => home(),
        Some(rest) if rest.starts_with('/') => home().join(rest.trim_start_matches('/')),
        _ => PathBuf::from(raw),
    }
}

/// Positive whole number of days.
pub fn parse_days(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|d| *d > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("archmaint").join("config.conf"))
    }

    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut fields = Map::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let (key, value) = text.split_once('=').ok_or_else(|| ConfigError::Syntax {
                line,
                text: text.to_string(),
            })?;
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            let Some(kind) = kind_of(key) else {
                tracing::warn!("Ignoring unknown config key '{}' on line {}", key, line);
                continue;
            };

            let invalid = || ConfigError::InvalidValue {
                line,
                key: key.to_string(),
                value: value.to_string(),
            };
            let parsed = match kind {
                ValueKind::Flag => Value::Bool(parse_flag(value).ok_or_else(invalid)?),
                ValueKind::Days => Value::from(parse_days(value).ok_or_else(invalid)?),
                ValueKind::Path if value.is_empty() => return Err(invalid()),
                ValueKind::Path => Value::String(expand_home(value).to_string_lossy().to_string()),
            };
            fields.insert(key.to_string(), parsed);
        }

        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// File contents with a generated-at header and every key.
    pub fn render(&self) -> Result<String, ConfigError> {
        let mut out = format!(
            "# ArchMaint Configuration\n# Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Value::Object(fields) = serde_json::to_value(self)? {
            for (key, value) in fields {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                out.push_str(&format!("{}={}\n", key, value));
            }
        }
        Ok(out)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render()?)?;
        tracing::info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub fn policy(&self) -> SafetyPolicy {
        SafetyPolicy {
            dry_run: self.dry_run,
            safe_mode: self.safe_mode,
            auto_confirm: self.auto_confirm,
            verbose: self.verbose_mode,
        }
    }

    /// Copies runtime policy changes back so an export records them.
    pub fn set_policy(&mut self, policy: &SafetyPolicy) {
        self.dry_run = policy.dry_run;
        self.safe_mode = policy.safe_mode;
        self.auto_confirm = policy.auto_confirm;
        self.verbose_mode = policy.verbose;
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            cache_retention_days: self.cache_retention_days,
            log_retention_days: self.log_retention_days,
            escalation: self.escalation.clone(),
            user_cache_dir: dirs::cache_dir().unwrap_or_else(|| home().join(".cache")),
        }
    }

    pub fn maintainer_settings(&self) -> MaintainerSettings {
        MaintainerSettings {
            backup_enabled: self.backup_enabled,
            backup_path: self.backup_path.clone(),
            escalation: self.escalation.clone(),
            ..Default::default()
        }
    }
}
