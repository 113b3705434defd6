//! Build local document sections from pasted regional-dex text
//!
//! The input lists each species as a display-name line immediately
//! followed by its regional number:
//!
//! ```text
//! Chikorita
//! #001
//! Chikorita
//! Grass
//! ```
//!
//! Any other line (repeated names, type lines) is ignored. Each species'
//! global identifier is looked up through the remote catalog.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::entry::SpeciesEntry;
use super::local::{LocalDocument, LocalSection};
use super::remote::RemoteCatalog;

static NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(\d+)\s*$").expect("number line pattern is valid"));

/// Names whose identity key cannot be derived mechanically
static SPECIAL_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Flabébé", "flabebe"),
        ("Farfetch'd", "farfetchd"),
        ("Sirfetch'd", "sirfetchd"),
        ("Mime Jr.", "mime-jr"),
        ("Mr. Mime", "mr-mime"),
        ("Mr. Rime", "mr-rime"),
        ("Type: Null", "type-null"),
        ("Nidoran♀", "nidoran-f"),
        ("Nidoran♂", "nidoran-m"),
    ])
});

/// A species line pair parsed from raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub number: u32,
    pub display_name: String,
}

/// Parse `name` / `#NNN` line pairs; blank lines are skipped
pub fn parse_raw_dex(text: &str) -> Vec<RawEntry> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .windows(2)
        .filter_map(|pair| {
            let number = NUMBER_LINE.captures(pair[1])?.get(1)?.as_str().parse().ok()?;
            Some(RawEntry {
                number,
                display_name: pair[0].to_string(),
            })
        })
        .collect()
}

/// Derive the identity key for a display name
///
/// `Mr. Mime` → `mr-mime`, `Flabébé` → `flabebe`, `Tapu Koko` → `tapu-koko`
pub fn api_name_for(display_name: &str) -> String {
    if let Some(special) = SPECIAL_NAMES.get(display_name) {
        return special.to_string();
    }

    let folded: String = display_name
        .trim()
        .chars()
        .filter_map(|c| match c {
            'é' | 'è' | 'ê' | 'É' => Some('e'),
            '\'' | '’' | '.' | ':' => None,
            other => Some(other),
        })
        .collect::<String>()
        .to_lowercase();

    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Turns raw section text into local document sections
pub struct LocalDocumentBuilder {
    remote: Arc<dyn RemoteCatalog>,
}

impl LocalDocumentBuilder {
    pub fn new(remote: Arc<dyn RemoteCatalog>) -> Self {
        Self { remote }
    }

    /// Build one section, looking up every species identifier
    ///
    /// Lookups run concurrently. Entries are ordered by regional number. A
    /// lookup failure aborts the section: an entry without a global
    /// identifier cannot be sorted.
    pub async fn build_section(&self, id: &str, name: &str, raw_text: &str) -> Result<LocalSection> {
        use futures::future::join_all;

        let lookups: Vec<_> = parse_raw_dex(raw_text)
            .into_iter()
            .map(|raw| {
                let remote = Arc::clone(&self.remote);
                async move {
                    let api_name = api_name_for(&raw.display_name);
                    let species_id = remote.fetch_species_id(&api_name).await.with_context(|| {
                        format!("Failed to look up species '{}' ({})", raw.display_name, api_name)
                    })?;

                    debug!("{} #{:03} → {} ({})", id, raw.number, api_name, species_id);
                    Ok::<_, anyhow::Error>(SpeciesEntry {
                        api_name,
                        display_name: raw.display_name,
                        entry_number: raw.number,
                        species_id,
                    })
                }
            })
            .collect();

        let mut pokemon = join_all(lookups)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        pokemon.sort_by_key(|e| e.entry_number);

        if pokemon.is_empty() {
            warn!("Parsed 0 entries for section '{}'; check the input formatting", id);
        }

        Ok(LocalSection {
            id: id.to_string(),
            name: Some(name.to_string()),
            pokemon,
        })
    }

    /// Assemble a document from built sections
    pub fn document(game_id: &str, sections: Vec<LocalSection>) -> LocalDocument {
        LocalDocument {
            game_id: Some(game_id.to_string()),
            sections,
        }
    }
}
