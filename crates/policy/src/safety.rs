use serde::{Deserialize, Serialize};

/// Process-wide safety switches.
///
/// Owned by the application and handed by reference to every confirmation
/// and dry-run decision. Only the explicit `toggle_*` calls mutate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyPolicy {
    pub dry_run: bool,
    pub safe_mode: bool,
    pub auto_confirm: bool,
    pub verbose: bool,
}

impl SafetyPolicy {
    pub fn toggle_dry_run(&mut self) -> bool {
        self.dry_run = !self.dry_run;
        self.dry_run
    }

    pub fn toggle_safe_mode(&mut self) -> bool {
        self.safe_mode = !self.safe_mode;
        self.safe_mode
    }

    pub fn toggle_auto_confirm(&mut self) -> bool {
        self.auto_confirm = !self.auto_confirm;
        self.auto_confirm
    }

    pub fn toggle_verbose(&mut self) -> bool {
        self.verbose = !self.verbose;
        self.verbose
    }

    /// Short labels for the modes currently switched on, for banners.
    pub fn active_modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.dry_run {
            modes.push("DRY RUN MODE");
        }
        if self.safe_mode {
            modes.push("SAFE MODE");
        }
        if self.auto_confirm {
            modes.push("AUTO CONFIRM");
        }
        if self.verbose {
            modes.push("VERBOSE");
        }
        modes
    }
}
