//! Species entries - the unit held in every catalog list

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Base URL for species sprites
const SPRITE_BASE_URL: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Numeric identity segment inside a species reference URL
static SPECIES_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/pokemon-species/(\d+)/").expect("species id pattern is valid"));

/// One species within a resolved catalog
///
/// Field names on the wire follow the local document format
/// (`num`, `name`, `apiName`, `speciesId`); the longer spellings are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesEntry {
    /// Stable lowercase/hyphenated identity, the join key across sources
    #[serde(rename = "apiName")]
    pub api_name: String,

    /// Human-readable name
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,

    /// 1-based position within its own section
    #[serde(rename = "num", alias = "entryNumber")]
    pub entry_number: u32,

    /// Global numeric identity, sort key of the overall view
    #[serde(rename = "speciesId", alias = "speciesIdentifier")]
    pub species_id: u32,
}

/// How an entry's number is shown in a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// Section-local entry number, three digits
    Regional,
    /// Global species identifier, four digits
    National,
}

impl SpeciesEntry {
    /// Build an entry from a remote catalog record
    ///
    /// Fails with [`CatalogError::ParseFailure`] when the species URL carries
    /// no numeric identity.
    pub fn from_remote(entry_number: u32, api_name: &str, species_url: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            api_name: api_name.to_string(),
            display_name: display_name_from_api(api_name),
            entry_number,
            species_id: species_id_from_url(species_url)?,
        })
    }

    /// Zero-padded number for display
    pub fn display_number(&self, numbering: Numbering) -> String {
        match numbering {
            Numbering::Regional => format!("{:03}", self.entry_number),
            Numbering::National => format!("{:04}", self.species_id),
        }
    }

    /// Sprite image URL for this species
    pub fn sprite_url(&self, shiny: bool) -> String {
        let variant = if shiny { "shiny/" } else { "" };
        format!("{SPRITE_BASE_URL}/{variant}{}.png", self.species_id)
    }
}

/// Derive a display name: hyphens become spaces, each word title-cased
///
/// `mr-mime` → `Mr Mime`, `pikachu` → `Pikachu`
pub fn display_name_from_api(api_name: &str) -> String {
    api_name
        .split('-')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extract the numeric species identifier from a species reference URL
pub fn species_id_from_url(url: &str) -> Result<u32, CatalogError> {
    SPECIES_ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| CatalogError::ParseFailure {
            url: url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_api() {
        assert_eq!(display_name_from_api("pikachu"), "Pikachu");
        assert_eq!(display_name_from_api("mr-mime"), "Mr Mime");
        assert_eq!(display_name_from_api("tapu-koko"), "Tapu Koko");
        assert_eq!(display_name_from_api("jangmo-o"), "Jangmo O");
    }

    #[test]
    fn test_display_name_tolerates_empty_segments() {
        assert_eq!(display_name_from_api("porygon--z"), "Porygon  Z");
        assert_eq!(display_name_from_api(""), "");
    }

    #[test]
    fn test_species_id_from_url() {
        let id = species_id_from_url("https://pokeapi.co/api/v2/pokemon-species/25/").unwrap();
        assert_eq!(id, 25);

        let id = species_id_from_url("https://pokeapi.co/api/v2/pokemon-species/1010/").unwrap();
        assert_eq!(id, 1010);
    }

    #[test]
    fn test_species_id_requires_trailing_slash_and_digits() {
        for url in [
            "https://pokeapi.co/api/v2/pokemon-species/25",
            "https://pokeapi.co/api/v2/pokemon-species/pikachu/",
            "https://pokeapi.co/api/v2/pokemon/25/",
        ] {
            let err = species_id_from_url(url).unwrap_err();
            assert!(matches!(err, CatalogError::ParseFailure { .. }), "{url}");
        }
    }

    #[test]
    fn test_from_remote() {
        let entry = SpeciesEntry::from_remote(
            7,
            "mr-mime",
            "https://pokeapi.co/api/v2/pokemon-species/122/",
        )
        .unwrap();

        assert_eq!(entry.api_name, "mr-mime");
        assert_eq!(entry.display_name, "Mr Mime");
        assert_eq!(entry.entry_number, 7);
        assert_eq!(entry.species_id, 122);
    }

    #[test]
    fn test_display_number() {
        let entry = SpeciesEntry {
            api_name: "pikachu".to_string(),
            display_name: "Pikachu".to_string(),
            entry_number: 25,
            species_id: 25,
        };
        assert_eq!(entry.display_number(Numbering::Regional), "025");
        assert_eq!(entry.display_number(Numbering::National), "0025");
    }

    #[test]
    fn test_sprite_url() {
        let entry = SpeciesEntry {
            api_name: "pikachu".to_string(),
            display_name: "Pikachu".to_string(),
            entry_number: 25,
            species_id: 25,
        };
        assert!(entry.sprite_url(false).ends_with("/sprites/pokemon/25.png"));
        assert!(entry.sprite_url(true).ends_with("/sprites/pokemon/shiny/25.png"));
    }

    #[test]
    fn test_local_document_field_names() {
        let entry: SpeciesEntry = serde_json::from_str(
            r#"{ "num": 1, "name": "Chikorita", "apiName": "chikorita", "speciesId": 152 }"#,
        )
        .unwrap();
        assert_eq!(entry.species_id, 152);
        assert_eq!(entry.entry_number, 1);

        let aliased: SpeciesEntry = serde_json::from_str(
            r#"{ "entryNumber": 1, "displayName": "Chikorita", "apiName": "chikorita", "speciesIdentifier": 152 }"#,
        )
        .unwrap();
        assert_eq!(aliased, entry);
    }
}
