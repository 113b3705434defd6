//! Command implementations

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::warn;

use dexkeeper_core::catalog::{LocalDocumentBuilder, PokeApiClient, SectionSource};
use dexkeeper_core::completion::{CompletionRecord, CompletionSnapshot, CompletionState, Mode, Progress};
use dexkeeper_core::{DexTracker, SectionView, TrackerConfig};

use crate::SectionInput;

/// Table row for the game list
#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Game")]
    name: String,
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Sections")]
    sections: String,
}

/// Table row for a section listing
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    number: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    api_name: String,
    #[tabled(rename = "Caught")]
    caught: &'static str,
}

fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

pub fn mode_for(shiny: bool) -> Mode {
    if shiny {
        Mode::Shiny
    } else {
        Mode::Normal
    }
}

pub fn state_label(state: CompletionState) -> &'static str {
    match state {
        CompletionState::Uncaught => "uncaught",
        CompletionState::Caught => "caught",
        CompletionState::CaughtShiny => "caught (shiny)",
    }
}

fn caught_mark(record: CompletionRecord, mode: Mode) -> &'static str {
    match (record.is_complete(mode), record.shiny) {
        (false, _) => "",
        (true, true) => "✓ ★",
        (true, false) => "✓",
    }
}

pub fn games(config: &TrackerConfig) {
    let rows: Vec<GameRow> = config
        .games
        .iter()
        .map(|game| GameRow {
            id: game.id.clone(),
            name: game.name.clone(),
            source: if game.local {
                "local"
            } else if game.is_synthetic() {
                "overall"
            } else {
                "remote"
            },
            sections: game
                .sections
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    println!("{}", render_table(&rows));
}

/// Print a resolved section, its marks and progress line
pub async fn print_view(tracker: &DexTracker, view: &SectionView) -> Result<()> {
    let snapshot = tracker.snapshot().await?;
    let progress = tracker.progress(view).await?;

    println!("{} / {} ({})", view.game.name, view.section.name, view.mode);

    if view.entries().is_empty() {
        match view.diagnostic() {
            Some(diagnostic) => println!("No entries could be loaded. {diagnostic}"),
            None => println!("No entries."),
        }
    } else {
        let rows = entry_rows(view, &snapshot);
        println!("{}", render_table(&rows));
    }

    println!("{progress}");
    Ok(())
}

fn entry_rows(view: &SectionView, snapshot: &CompletionSnapshot) -> Vec<EntryRow> {
    view.entries()
        .iter()
        .map(|entry| EntryRow {
            number: entry.display_number(view.numbering),
            name: entry.display_name.clone(),
            api_name: entry.api_name.clone(),
            caught: caught_mark(snapshot.record(&entry.api_name), view.mode),
        })
        .collect()
}

fn view_json(view: &SectionView, snapshot: &CompletionSnapshot, progress: Progress) -> serde_json::Value {
    let shiny = view.mode == Mode::Shiny;
    let entries: Vec<serde_json::Value> = view
        .entries()
        .iter()
        .map(|entry| {
            let record = snapshot.record(&entry.api_name);
            serde_json::json!({
                "number": entry.display_number(view.numbering),
                "apiName": entry.api_name,
                "name": entry.display_name,
                "speciesId": entry.species_id,
                "normal": record.normal,
                "shiny": record.shiny,
                "sprite": entry.sprite_url(shiny),
            })
        })
        .collect();

    serde_json::json!({
        "game": view.game.id,
        "section": view.section.id,
        "mode": view.mode,
        "progress": {
            "done": progress.done,
            "total": progress.total,
            "percent": progress.percent(),
        },
        "diagnostic": view.diagnostic().map(|d| d.to_string()),
        "entries": entries,
    })
}

pub async fn show(
    tracker: &DexTracker,
    game: &str,
    section: Option<&str>,
    shiny: bool,
    json_output: bool,
) -> Result<()> {
    tracker.set_mode(game, mode_for(shiny))?;
    let view = tracker.section_view(game, section).await?;

    if json_output {
        let snapshot = tracker.snapshot().await?;
        let progress = tracker.progress(&view).await?;
        let value = view_json(&view, &snapshot, progress);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_view(tracker, &view).await
}

pub async fn toggle(tracker: &DexTracker, api_name: &str, shiny: bool) -> Result<()> {
    let state = tracker
        .completion()
        .toggle(api_name, mode_for(shiny))
        .await
        .with_context(|| format!("Failed to toggle '{api_name}'"))?;

    println!("{api_name}: {}", state_label(state));
    Ok(())
}

pub async fn build_local(
    config: &TrackerConfig,
    game: &str,
    sections: &[SectionInput],
    output: Option<&Path>,
) -> Result<()> {
    if let Some(configured) = config.game(game) {
        for input in sections {
            let known = configured
                .section(&input.id)
                .is_some_and(|s| matches!(configured.source_of(s), SectionSource::Local { .. }));
            if !known {
                warn!(
                    "Section '{}' is not a local section of '{}' in the current config",
                    input.id,
                    game
                );
            }
        }
    }

    let remote = PokeApiClient::new(&config.api_base_url, config.timeout_seconds, &config.user_agent)?;
    let builder = LocalDocumentBuilder::new(Arc::new(remote));

    let mut built = Vec::new();
    for input in sections {
        let raw = tokio::fs::read_to_string(&input.file)
            .await
            .with_context(|| format!("Failed to read {}", input.file.display()))?;

        let section = builder.build_section(&input.id, &input.name, &raw).await?;
        eprintln!("{}: {} entries", section.id, section.pokemon.len());
        built.push(section);
    }

    let document = LocalDocumentBuilder::document(game, built);
    let json = document.to_json()?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
