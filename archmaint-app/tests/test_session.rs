use archmaint_app::{commands, menu, App, AppConfig, Command};
use archmaint_executor::ScriptedRunner;
use archmaint_interfaces::ScriptedInterface;
use archmaint_tasks::catalog::names;
use std::path::Path;
use std::sync::Arc;

fn app(
    config: AppConfig,
    config_path: &Path,
    runner: Arc<ScriptedRunner>,
    ui: Arc<ScriptedInterface>,
) -> App {
    App::new(config, config_path.to_path_buf(), runner, ui)
}

fn said(ui: &ScriptedInterface, needle: &str) -> bool {
    ui.transcript().iter().any(|line| line.contains(needle))
}

#[tokio::test]
async fn test_menu_runs_choice_then_exits() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new().respond("pacman -Qtdq", 1, ""));
    let ui = Arc::new(ScriptedInterface::new(["42", "4", "", "0"]));
    let mut app = app(AppConfig::default(), &dir.path().join("c.conf"), runner.clone(), ui.clone());

    menu::run(&mut app).await.unwrap();

    assert!(said(&ui, "Invalid choice. Please try again."));
    assert!(said(&ui, "No orphaned packages found!"));
    assert!(said(&ui, "Goodbye!"));
    assert_eq!(runner.command_lines(), vec!["pacman -Qtdq"]);
    assert_eq!(ui.remaining_input(), 0);
}

#[tokio::test]
async fn test_menu_stops_on_closed_input() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    let ui = Arc::new(ScriptedInterface::new(Vec::<String>::new()));
    let mut app = app(AppConfig::default(), &dir.path().join("c.conf"), runner.clone(), ui.clone());

    menu::run(&mut app).await.unwrap();
    assert!(runner.command_lines().is_empty());
}

#[tokio::test]
async fn test_dry_run_clean_command_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    let ui = Arc::new(ScriptedInterface::new(Vec::<String>::new()));
    let config = AppConfig {
        dry_run: true,
        auto_confirm: true,
        ..Default::default()
    };
    let mut app = app(config, &dir.path().join("c.conf"), runner.clone(), ui.clone());

    let ok = commands::run(&mut app, &Command::Clean).await.unwrap();

    assert!(ok);
    assert!(runner.command_lines().is_empty());
    assert!(said(&ui, "[dry-run] Would run: sudo journalctl --vacuum-time=7d"));
}

#[tokio::test]
async fn test_config_manager_toggles_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archmaint").join("config.conf");
    let runner = Arc::new(ScriptedRunner::new());
    let ui = Arc::new(ScriptedInterface::new(["1", "4", "60", "5", "0", "7", "0"]));
    let mut app = app(AppConfig::default(), &path, runner, ui.clone());

    commands::run(&mut app, &Command::Config).await.unwrap();

    assert!(app.maintainer.policy().dry_run);
    assert_eq!(app.config.cache_retention_days, 60);
    assert_eq!(app.config.log_retention_days, 7);
    assert!(said(&ui, "Retention must be a positive number of days."));

    let user_cache = app.maintainer.registry().find(names::USER_CACHE).unwrap();
    assert!(user_cache.command.contains(&"+60".to_string()));

    let saved = AppConfig::load(&path).unwrap();
    assert!(saved.dry_run);
    assert_eq!(saved.cache_retention_days, 60);
}

#[tokio::test]
async fn test_failed_step_reports_false() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond("pacman -Qtdq", 0, "libfoo\n")
            .respond("sudo pacman -Rns --noconfirm libfoo", 1, ""),
    );
    let ui = Arc::new(ScriptedInterface::new(["y"]));
    let mut app = app(AppConfig::default(), &dir.path().join("c.conf"), runner, ui);

    let ok = commands::run(&mut app, &Command::Orphans).await.unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn test_empty_search_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    let ui = Arc::new(ScriptedInterface::new(Vec::<String>::new()));
    let mut app = app(AppConfig::default(), &dir.path().join("c.conf"), runner, ui);

    let err = commands::run(&mut app, &Command::Search { term: " ".to_string() })
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("search term must not be empty"));
}
