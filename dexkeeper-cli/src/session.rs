//! Interactive session
//!
//! Holds the current game and section between commands. Display modes are
//! kept by the tracker per game for as long as the session runs.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use dexkeeper_core::completion::Mode;
use dexkeeper_core::DexTracker;

use crate::commands;

const HELP: &str = "\
Commands:
  games               list games
  game <id>           switch game (first section)
  section <id>        switch section within the game
  mode normal|shiny   set the current game's display mode
  toggle <api-name>   toggle a species in the current mode
  list                show the current section
  help                show this help
  quit                leave the session";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Games,
    Game(String),
    Section(String),
    Mode(Mode),
    Toggle(String),
    List,
    Help,
    Quit,
}

impl SessionCommand {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let argument = words.next();

        let required = |name: &str| {
            argument
                .map(str::to_string)
                .ok_or_else(|| format!("Usage: {command} <{name}>"))
        };

        let parsed = match command {
            "games" => SessionCommand::Games,
            "game" => SessionCommand::Game(required("id")?),
            "section" => SessionCommand::Section(required("id")?),
            "mode" => SessionCommand::Mode(required("normal|shiny")?.parse()?),
            "toggle" => SessionCommand::Toggle(required("api-name")?),
            "list" | "ls" => SessionCommand::List,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => return Err(format!("Unknown command '{other}' (try 'help')")),
        };

        Ok(Some(parsed))
    }
}

struct Session<'a> {
    tracker: &'a DexTracker,
    game: String,
    section: Option<String>,
}

impl Session<'_> {
    async fn show(&self) -> Result<()> {
        let view = self
            .tracker
            .section_view(&self.game, self.section.as_deref())
            .await?;
        commands::print_view(self.tracker, &view).await
    }

    /// Returns false when the session should end
    async fn handle(&mut self, command: SessionCommand) -> Result<bool> {
        match command {
            SessionCommand::Games => commands::games(self.tracker.config()),
            SessionCommand::Game(id) => {
                self.tracker.game(&id)?;
                self.game = id;
                self.section = None;
                self.show().await?;
            }
            SessionCommand::Section(id) => {
                self.tracker.section_view(&self.game, Some(&id)).await?;
                self.section = Some(id);
                self.show().await?;
            }
            SessionCommand::Mode(mode) => {
                self.tracker.set_mode(&self.game, mode)?;
                self.show().await?;
            }
            SessionCommand::Toggle(api_name) => {
                let state = self.tracker.toggle(&self.game, &api_name).await?;
                println!("{api_name}: {}", commands::state_label(state));
            }
            SessionCommand::List => self.show().await?,
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn prompt(game: &str) {
    print!("{game}> ");
    // A failed flush only loses the prompt
    let _ = std::io::stdout().flush();
}

pub async fn run(tracker: &DexTracker) -> Result<()> {
    let overall = tracker.initialize().await;
    if !overall.degraded().is_empty() {
        eprintln!(
            "{} section(s) could not be loaded; the overall dex is incomplete",
            overall.degraded().len()
        );
    }

    let Some(first) = tracker.games().first() else {
        anyhow::bail!("No games configured");
    };

    let mut session = Session {
        tracker,
        game: first.id.clone(),
        section: None,
    };

    println!("{HELP}");
    session.show().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session.game);
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match session.handle(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("games"), Ok(Some(SessionCommand::Games)));
        assert_eq!(
            SessionCommand::parse("  game gen9 "),
            Ok(Some(SessionCommand::Game("gen9".to_string())))
        );
        assert_eq!(
            SessionCommand::parse("mode SHINY"),
            Ok(Some(SessionCommand::Mode(Mode::Shiny)))
        );
        assert_eq!(
            SessionCommand::parse("toggle mr-mime"),
            Ok(Some(SessionCommand::Toggle("mr-mime".to_string())))
        );
        assert_eq!(SessionCommand::parse("exit"), Ok(Some(SessionCommand::Quit)));
        assert_eq!(SessionCommand::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            SessionCommand::parse("game"),
            Err("Usage: game <id>".to_string())
        );
        assert!(SessionCommand::parse("mode golden").is_err());
        assert!(SessionCommand::parse("catch pikachu").is_err());
    }
}
