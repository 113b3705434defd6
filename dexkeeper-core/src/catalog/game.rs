//! Games and their sections (static configuration)

use serde::{Deserialize, Serialize};

use super::cache::CacheKey;

/// A named sub-catalog within a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier, unique within its game
    pub id: String,

    /// Display name
    pub name: String,

    /// Remote catalog identifier; absent for locally-resolved and synthetic sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dex: Option<String>,
}

/// A game with an ordered, non-empty list of sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Game identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether sections resolve from the shared local document
    #[serde(default)]
    pub local: bool,

    /// Sections in display order
    pub sections: Vec<Section>,
}

/// Where a section's species list comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSource<'a> {
    /// Paginated remote catalog keyed by identifier
    Remote { catalog_id: &'a str },
    /// Sub-entry of the shared local document
    Local { game_id: &'a str, section_id: &'a str },
    /// No source of its own; the overall union is shown instead
    Synthetic,
}

impl SectionSource<'_> {
    /// Cache key for this source, `None` for synthetic sections
    pub fn cache_key(&self) -> Option<CacheKey> {
        match self {
            SectionSource::Remote { catalog_id } => Some(CacheKey::Remote(catalog_id.to_string())),
            SectionSource::Local { game_id, section_id } => Some(CacheKey::Local {
                game: game_id.to_string(),
                section: section_id.to_string(),
            }),
            SectionSource::Synthetic => None,
        }
    }
}

impl Section {
    /// Create a remote section
    pub fn remote(id: &str, name: &str, dex: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dex: Some(dex.to_string()),
        }
    }

    /// Create a section with no remote catalog (local or synthetic)
    pub fn unsourced(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dex: None,
        }
    }
}

impl Game {
    /// Resolve the source of one of this game's sections
    ///
    /// The game's locality flag wins over any remote identifier.
    pub fn source_of<'a>(&'a self, section: &'a Section) -> SectionSource<'a> {
        if self.local {
            return SectionSource::Local {
                game_id: &self.id,
                section_id: &section.id,
            };
        }

        match section.dex.as_deref() {
            Some(catalog_id) => SectionSource::Remote { catalog_id },
            None => SectionSource::Synthetic,
        }
    }

    /// Look up a section by identifier
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// First section, shown when no section is selected
    pub fn default_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// Whether every section of this game is synthetic (the overall view)
    pub fn is_synthetic(&self) -> bool {
        self.sections
            .iter()
            .all(|s| matches!(self.source_of(s), SectionSource::Synthetic))
    }
}
