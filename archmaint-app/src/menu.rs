//! Interactive main menu - persistent loop until `0` or end of input

use crate::app::App;
use crate::cli::Command;
use crate::{commands, ui};
use anyhow::Result;
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(usize),
    Search,
    Help,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "0" => Some(MenuChoice::Exit),
            "9" => Some(MenuChoice::Search),
            "h" | "H" => Some(MenuChoice::Help),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=12).contains(n))
                .map(MenuChoice::Run),
        }
    }
}

fn command_for(number: usize) -> Option<Command> {
    let command = match number {
        1 => Command::Status,
        2 => Command::Update,
        3 => Command::Clean,
        4 => Command::Orphans,
        5 => Command::Services,
        6 => Command::Logs,
        7 => Command::Health,
        8 => Command::Maintenance,
        10 => Command::Backup,
        11 => Command::Snapshot,
        12 => Command::Config,
        _ => return None,
    };
    Some(command)
}

pub async fn run(app: &mut App) -> Result<()> {
    let ui = app.ui();
    let ui = ui.as_ref();

    loop {
        ui::banner(ui, app.maintainer.policy()).await;
        ui::show_menu(ui).await;
        ui.prompt("\nEnter your choice: ").await;

        let Some(line) = ui::read_line(ui).await else {
            break;
        };

        let command = match MenuChoice::parse(&line) {
            Some(MenuChoice::Exit) => break,
            Some(MenuChoice::Help) => {
                ui::show_help(ui, app.maintainer.policy()).await;
                ui::wait_for_continue(ui).await;
                continue;
            }
            Some(MenuChoice::Search) => {
                ui.prompt("Enter search term: ").await;
                let Some(term) = ui::read_line(ui).await else {
                    break;
                };
                Command::Search { term }
            }
            Some(MenuChoice::Run(number)) => match command_for(number) {
                Some(command) => command,
                None => continue,
            },
            None => {
                ui.send_output(&"Invalid choice. Please try again.".red().to_string())
                    .await;
                continue;
            }
        };

        tracing::info!("Menu selection: {:?}", command);
        if let Err(e) = commands::run(app, &command).await {
            ui.send_output(&format!("❌ Error: {:#}", e).red().to_string())
                .await;
        }

        if command != Command::Config {
            ui::wait_for_continue(ui).await;
        }
    }

    ui.send_output(&"Goodbye! Keep your Arch system running smoothly!".green().bold().to_string())
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices() {
        assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::Run(3)));
        assert_eq!(MenuChoice::parse("12"), Some(MenuChoice::Run(12)));
        assert_eq!(MenuChoice::parse("9"), Some(MenuChoice::Search));
        assert_eq!(MenuChoice::parse("H"), Some(MenuChoice::Help));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("13"), None);
        assert_eq!(MenuChoice::parse("status"), None);
    }

    #[test]
    fn test_every_numbered_entry_maps_to_a_command() {
        for n in (1..=12).filter(|n| *n != 9) {
            assert!(command_for(n).is_some(), "menu entry {} has no command", n);
        }
    }
}
