pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod menu;
pub mod ui;

pub use app::App;
pub use cli::{Cli, Command};
pub use config::{AppConfig, ConfigError};
