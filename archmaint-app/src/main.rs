use anyhow::{Context, Result};
use archmaint_app::{commands, menu, App, AppConfig, Cli};
use archmaint_executor::{CommandRunner, SystemRunner};
use archmaint_interfaces::{Interface, TerminalInterface};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ARCHMAINT_LOG";

fn init_tracing(verbose: bool) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => EnvFilter::new(v),
        _ => EnvFilter::new(if verbose { "info" } else { "warn" }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    match real_main(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn real_main(cli: Cli) -> Result<ExitCode> {
    let config_path = cli
        .config
        .clone()
        .or_else(AppConfig::default_path)
        .context("Could not determine the config directory")?;

    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    cli.apply(&mut config);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new());
    let ui: Arc<dyn Interface> = Arc::new(TerminalInterface::new());
    let mut app = App::new(config, config_path, runner, ui);

    match cli.command {
        Some(command) => {
            let ok = commands::run(&mut app, &command).await?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        None => {
            menu::run(&mut app).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
