use crate::config::AppConfig;
use archmaint_core::Maintainer;
use archmaint_executor::CommandRunner;
use archmaint_interfaces::Interface;
use archmaint_tasks::TaskRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// One interactive or one-shot session: the loaded config and the
/// workflow engine built from it.
pub struct App {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub maintainer: Maintainer,
}

impl App {
    pub fn new(
        config: AppConfig,
        config_path: PathBuf,
        runner: Arc<dyn CommandRunner>,
        ui: Arc<dyn Interface>,
    ) -> Self {
        let maintainer = Maintainer::new(
            config.policy(),
            config.maintainer_settings(),
            TaskRegistry::builtin(&config.registry_settings()),
            runner,
            ui,
        );
        Self {
            config,
            config_path,
            maintainer,
        }
    }

    pub fn ui(&self) -> Arc<dyn Interface> {
        self.maintainer.interface().clone()
    }

    /// Pushes config edits into the running engine.
    pub fn sync(&mut self) {
        *self.maintainer.policy_mut() = self.config.policy();
        *self.maintainer.settings_mut() = self.config.maintainer_settings();
        self.maintainer
            .set_registry(TaskRegistry::builtin(&self.config.registry_settings()));
    }
}
