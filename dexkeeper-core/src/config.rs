//! Tracker configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Explicit path (CLI `--config`)
//! 2. `~/.config/dexkeeper/config.yaml` (platform config directory)
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```yaml
//! api_base_url: https://pokeapi.co/api/v2/
//! timeout_seconds: 30
//! local_document:
//!   - data/lza.json
//!   - https://example.com/static/lza.json
//! games:
//!   - id: gen1
//!     name: Red / Blue / Yellow
//!     sections:
//!       - { id: kanto, name: Kanto, dex: kanto }
//!   - id: gen10-lza
//!     name: "Legends: Z-A"
//!     local: true
//!     sections:
//!       - { id: kalos-base, name: Kalos }
//! ```
//!
//! Relative `local_document` paths resolve against the config file's
//! directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::{DocumentLocation, Game, Section, DEFAULT_API_BASE_URL};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the remote species catalog API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for network requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent sent with network requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Ordered candidate locations of the shared local document
    #[serde(default = "default_local_document")]
    pub local_document: Vec<DocumentLocation>,

    /// Games in display order
    #[serde(default = "default_games")]
    pub games: Vec<Game>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            local_document: default_local_document(),
            games: default_games(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("dexkeeper/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_local_document() -> Vec<DocumentLocation> {
    ["data/lza.json", "static/data/lza.json", "lza.json", "static/lza.json"]
        .into_iter()
        .map(DocumentLocation::from)
        .collect()
}

fn remote_game(id: &str, name: &str, sections: &[(&str, &str, &str)]) -> Game {
    Game {
        id: id.to_string(),
        name: name.to_string(),
        local: false,
        sections: sections
            .iter()
            .map(|(id, name, dex)| Section::remote(id, name, dex))
            .collect(),
    }
}

/// The shipped game list
pub fn default_games() -> Vec<Game> {
    vec![
        remote_game("gen1", "Red / Blue / Yellow", &[("kanto", "Kanto", "kanto")]),
        remote_game("gen2", "Gold / Silver / Crystal", &[("johto", "Johto", "original-johto")]),
        remote_game("gen3", "Ruby / Sapphire / Emerald", &[("hoenn", "Hoenn", "hoenn")]),
        remote_game("gen4", "Diamond / Pearl / Platinum", &[("sinnoh", "Sinnoh", "extended-sinnoh")]),
        remote_game("gen5", "Black / White / B2W2", &[("unova", "Unova", "updated-unova")]),
        remote_game(
            "gen6",
            "X / Y",
            &[
                ("kalos-c", "Kalos Central", "kalos-central"),
                ("kalos-co", "Kalos Coastal", "kalos-coastal"),
                ("kalos-m", "Kalos Mountain", "kalos-mountain"),
            ],
        ),
        remote_game("gen7", "Sun / Moon / Ultra", &[("alola", "Alola", "updated-alola")]),
        remote_game(
            "gen8-swsh",
            "Sword / Shield",
            &[
                ("galar", "Galar", "galar"),
                ("ioa", "Isle of Armor", "isle-of-armor"),
                ("ct", "Crown Tundra", "crown-tundra"),
            ],
        ),
        remote_game("gen8-pla", "Legends: Arceus", &[("hisui", "Hisui", "hisui")]),
        remote_game(
            "gen9",
            "Scarlet / Violet",
            &[
                ("paldea", "Paldea", "paldea"),
                ("tm", "Kitakami", "kitakami"),
                ("id", "Blueberry", "blueberry"),
            ],
        ),
        Game {
            id: "gen10-lza".to_string(),
            name: "Legends: Z-A".to_string(),
            local: true,
            sections: vec![
                Section::unsourced("kalos-base", "Kalos"),
                Section::unsourced("mega-dimension", "Mega Dimension"),
            ],
        },
        Game {
            id: "overall".to_string(),
            name: "Overall Dex".to_string(),
            local: false,
            sections: vec![Section::unsourced("national", "National Dex")],
        },
    ]
}

impl TrackerConfig {
    /// Load from an explicit path, the default location, or built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a YAML config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.local_document = config
                .local_document
                .into_iter()
                .map(|location| location.resolve_against(base))
                .collect();
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content).context("Invalid config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural rules the engine relies on
    pub fn validate(&self) -> Result<()> {
        let mut game_ids = HashSet::new();

        for game in &self.games {
            if !game_ids.insert(game.id.as_str()) {
                anyhow::bail!("Duplicate game id '{}'", game.id);
            }

            if game.sections.is_empty() {
                anyhow::bail!("Game '{}' has no sections", game.id);
            }

            let mut section_ids = HashSet::new();
            for section in &game.sections {
                if !section_ids.insert(section.id.as_str()) {
                    anyhow::bail!("Duplicate section id '{}' in game '{}'", section.id, game.id);
                }

                if game.local && section.dex.is_some() {
                    anyhow::bail!(
                        "Section '{}' of local game '{}' must not name a remote catalog",
                        section.id,
                        game.id
                    );
                }
            }
        }

        Ok(())
    }

    /// Look up a game by identifier
    pub fn game(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Default completion file location
    pub fn default_store_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().join("caught.json"))
            .unwrap_or_else(|| PathBuf::from("data/caught.json"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", "dexkeeper", "dexkeeper")
}
