//! Local catalog document
//!
//! Content the remote provider does not carry yet (new or unreleased
//! games) lives in one shared JSON document:
//!
//! ```json
//! { "gameId": "gen10-lza",
//!   "sections": [ { "id": "kalos-base", "name": "Kalos", "pokemon": [ ... ] } ] }
//! ```
//!
//! The document is found by trying an ordered list of candidate locations.
//! It is resolved lazily, at most once per [`LocalDocumentSource`]: the
//! parsed document, or the aggregate failure, is reused for every later
//! local request regardless of which section it names.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::entry::SpeciesEntry;
use super::fallback;
use crate::error::{Attempt, CatalogError};

/// Where a local document may be found
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentLocation {
    /// `http://` or `https://` URL
    Url(String),
    /// Filesystem path
    Path(PathBuf),
}

impl From<String> for DocumentLocation {
    fn from(raw: String) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DocumentLocation::Url(raw)
        } else {
            DocumentLocation::Path(PathBuf::from(raw))
        }
    }
}

impl From<&str> for DocumentLocation {
    fn from(raw: &str) -> Self {
        DocumentLocation::from(raw.to_string())
    }
}

impl From<DocumentLocation> for String {
    fn from(location: DocumentLocation) -> Self {
        location.to_string()
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::Url(url) => f.write_str(url),
            DocumentLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl DocumentLocation {
    /// Anchor a relative path at `base`; URLs and absolute paths are unchanged
    pub fn resolve_against(self, base: &Path) -> Self {
        match self {
            DocumentLocation::Path(path) if path.is_relative() => {
                DocumentLocation::Path(base.join(path))
            }
            other => other,
        }
    }
}

/// The shared local document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDocument {
    /// Game this document was generated for
    #[serde(rename = "gameId", default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,

    pub sections: Vec<LocalSection>,
}

/// One section of the local document; entries are already in final shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSection {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub pokemon: Vec<SpeciesEntry>,
}

impl LocalDocument {
    /// Parse a document, applying the minimal shape check
    ///
    /// The document must be an object exposing a `sections` array. Entries
    /// are then parsed strictly: one entry missing `num`, `name`, `apiName`
    /// or `speciesId` rejects the whole document, so the resolver moves on
    /// to the next candidate.
    pub fn from_json(content: &str, location: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| CatalogError::ShapeMismatch {
                location: location.to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;

        if !value.get("sections").is_some_and(|s| s.is_array()) {
            return Err(CatalogError::ShapeMismatch {
                location: location.to_string(),
                reason: "JSON missing sections[]".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| CatalogError::ShapeMismatch {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Find a section by identifier
    pub fn section(&self, id: &str) -> Option<&LocalSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Trait for reading raw document bytes from a location
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Read the document text; failures are [`CatalogError::SourceUnreachable`]
    async fn load(&self, location: &DocumentLocation) -> Result<String, CatalogError>;
}

/// Loader that reads URLs over HTTP and paths from disk
pub struct DefaultDocumentLoader {
    client: reqwest::Client,
}

impl DefaultDocumentLoader {
    pub fn new(timeout_seconds: u64, user_agent: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentLoader for DefaultDocumentLoader {
    async fn load(&self, location: &DocumentLocation) -> Result<String, CatalogError> {
        let unreachable = |reason: String| CatalogError::SourceUnreachable {
            location: location.to_string(),
            reason,
        };

        match location {
            DocumentLocation::Path(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| unreachable(e.to_string())),
            DocumentLocation::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| unreachable(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(unreachable(format!("HTTP {}", response.status().as_u16())));
                }

                response.text().await.map_err(|e| unreachable(e.to_string()))
            }
        }
    }
}

/// A resolved document and the candidates that failed before it
struct ResolvedDocument {
    document: Arc<LocalDocument>,
    skipped: Vec<Attempt>,
}

/// Resolves local sections from the shared document
pub struct LocalDocumentSource {
    loader: Arc<dyn DocumentLoader>,
    candidates: Vec<DocumentLocation>,
    document: OnceCell<Result<ResolvedDocument, CatalogError>>,
}

impl LocalDocumentSource {
    pub fn new(loader: Arc<dyn DocumentLoader>, candidates: Vec<DocumentLocation>) -> Self {
        Self {
            loader,
            candidates,
            document: OnceCell::new(),
        }
    }

    /// Candidate locations in resolution order
    pub fn candidates(&self) -> &[DocumentLocation] {
        &self.candidates
    }

    /// The shared document, resolving it on first use
    ///
    /// Concurrent first calls wait on one resolution. A terminal failure is
    /// kept for the lifetime of this source.
    pub async fn document(&self) -> Result<Arc<LocalDocument>, CatalogError> {
        match self.document.get_or_init(|| self.resolve_document()).await {
            Ok(resolved) => Ok(resolved.document.clone()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Candidates that failed before the winning one, in order
    ///
    /// Empty until the document has resolved, and when it failed outright
    /// (the failures are then in the [`CatalogError::Exhausted`] error).
    pub fn skipped(&self) -> &[Attempt] {
        match self.document.get() {
            Some(Ok(resolved)) => &resolved.skipped,
            _ => &[],
        }
    }

    /// The species list of one section
    ///
    /// A document that lacks the section yields an empty list, not an error.
    pub async fn section(&self, game_id: &str, section_id: &str) -> Result<Vec<SpeciesEntry>, CatalogError> {
        let document = self.document().await?;

        match document.section(section_id) {
            Some(section) => Ok(section.pokemon.clone()),
            None => {
                debug!(
                    "Local document has no section '{}' for game '{}'",
                    section_id, game_id
                );
                Ok(Vec::new())
            }
        }
    }

    async fn resolve_document(&self) -> Result<ResolvedDocument, CatalogError> {
        let loader = &self.loader;
        let resolved = fallback::first_success(&self.candidates, |location| async move {
            let content = loader.load(location).await?;
            LocalDocument::from_json(&content, &location.to_string())
        })
        .await;

        match resolved {
            Ok(resolved) => {
                info!(
                    "Loaded local document from {} ({} sections)",
                    self.candidates[resolved.index],
                    resolved.value.sections.len()
                );
                for attempt in &resolved.failures {
                    info!("Skipped local document candidate {}: {}", attempt.candidate, attempt.error);
                }
                Ok(ResolvedDocument {
                    document: Arc::new(resolved.value),
                    skipped: resolved.failures,
                })
            }
            Err(e) => {
                warn!("Could not load local document. {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Loader serving fixed documents by location
    struct FixedLoader {
        documents: HashMap<String, String>,
    }

    #[async_trait]
    impl DocumentLoader for FixedLoader {
        async fn load(&self, location: &DocumentLocation) -> Result<String, CatalogError> {
            self.documents
                .get(&location.to_string())
                .cloned()
                .ok_or_else(|| CatalogError::SourceUnreachable {
                    location: location.to_string(),
                    reason: "not found".to_string(),
                })
        }
    }

    const KALOS: &str = r#"{ "sections": [ { "id": "kalos-base", "pokemon": [
        { "num": 1, "name": "Chikorita", "apiName": "chikorita", "speciesId": 152 }
    ] } ] }"#;

    #[test]
    fn test_location_from_string() {
        assert_eq!(
            DocumentLocation::from("https://example.com/lza.json"),
            DocumentLocation::Url("https://example.com/lza.json".to_string())
        );
        assert_eq!(
            DocumentLocation::from("data/lza.json"),
            DocumentLocation::Path(PathBuf::from("data/lza.json"))
        );
    }

    #[test]
    fn test_location_resolve_against() {
        let base = Path::new("/etc/dexkeeper");
        assert_eq!(
            DocumentLocation::from("data/lza.json").resolve_against(base),
            DocumentLocation::Path(PathBuf::from("/etc/dexkeeper/data/lza.json"))
        );
        assert_eq!(
            DocumentLocation::from("/srv/lza.json").resolve_against(base),
            DocumentLocation::Path(PathBuf::from("/srv/lza.json"))
        );
        assert_eq!(
            DocumentLocation::from("http://host/lza.json").resolve_against(base),
            DocumentLocation::Url("http://host/lza.json".to_string())
        );
    }

    #[test]
    fn test_document_requires_sections_array() {
        let err = LocalDocument::from_json(r#"{ "gameId": "gen10-lza" }"#, "lza.json").unwrap_err();
        assert_eq!(
            err,
            CatalogError::ShapeMismatch {
                location: "lza.json".to_string(),
                reason: "JSON missing sections[]".to_string(),
            }
        );

        let err = LocalDocument::from_json(r#"{ "sections": {} }"#, "lza.json").unwrap_err();
        assert!(matches!(err, CatalogError::ShapeMismatch { .. }));

        let err = LocalDocument::from_json("not json", "lza.json").unwrap_err();
        assert!(matches!(err, CatalogError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_document_section_lookup() {
        let doc = LocalDocument::from_json(
            r#"{
                "gameId": "gen10-lza",
                "sections": [
                    { "id": "kalos-base", "name": "Kalos", "pokemon": [
                        { "num": 1, "name": "Chikorita", "apiName": "chikorita", "speciesId": 152 }
                    ] },
                    { "id": "mega-dimension", "name": "Mega Dimension", "pokemon": [] }
                ]
            }"#,
            "lza.json",
        )
        .unwrap();

        assert_eq!(doc.game_id.as_deref(), Some("gen10-lza"));
        assert_eq!(doc.section("kalos-base").unwrap().pokemon.len(), 1);
        assert!(doc.section("mega-dimension").unwrap().pokemon.is_empty());
        assert!(doc.section("unreleased").is_none());
    }

    #[test]
    fn test_document_json_round_trip() {
        let doc = LocalDocument {
            game_id: Some("gen10-lza".to_string()),
            sections: vec![LocalSection {
                id: "kalos-base".to_string(),
                name: Some("Kalos".to_string()),
                pokemon: vec![SpeciesEntry {
                    api_name: "chikorita".to_string(),
                    display_name: "Chikorita".to_string(),
                    entry_number: 1,
                    species_id: 152,
                }],
            }],
        };

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"apiName\": \"chikorita\""));
        assert!(json.contains("\"speciesId\": 152"));
        assert_eq!(LocalDocument::from_json(&json, "mem").unwrap(), doc);
    }

    #[test]
    fn test_entry_missing_species_id_rejects_document() {
        let err = LocalDocument::from_json(
            r#"{ "sections": [ { "id": "kalos-base", "pokemon": [
                { "num": 1, "name": "Chikorita", "apiName": "chikorita", "speciesId": 152 },
                { "num": 2, "name": "Bayleef", "apiName": "bayleef" }
            ] } ] }"#,
            "lza.json",
        )
        .unwrap_err();

        match err {
            CatalogError::ShapeMismatch { location, reason } => {
                assert_eq!(location, "lza.json");
                assert!(reason.contains("speciesId"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_skipped_candidates_are_kept() {
        let loader = FixedLoader {
            documents: HashMap::from([
                ("partial.json".to_string(), r#"{ "gameId": "gen10-lza" }"#.to_string()),
                ("lza.json".to_string(), KALOS.to_string()),
            ]),
        };
        let source = LocalDocumentSource::new(
            Arc::new(loader),
            vec!["missing.json".into(), "partial.json".into(), "lza.json".into()],
        );
        assert!(source.skipped().is_empty());

        let entries = source.section("gen10-lza", "kalos-base").await.unwrap();
        assert_eq!(entries[0].api_name, "chikorita");

        let skipped = source.skipped();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].candidate, "missing.json");
        assert!(matches!(skipped[0].error, CatalogError::SourceUnreachable { .. }));
        assert_eq!(skipped[1].candidate, "partial.json");
        assert!(matches!(skipped[1].error, CatalogError::ShapeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_exhausted_resolution_keeps_no_skipped_list() {
        let loader = FixedLoader {
            documents: HashMap::new(),
        };
        let source = LocalDocumentSource::new(Arc::new(loader), vec!["missing.json".into()]);

        let err = source.document().await.unwrap_err();
        assert_eq!(err.attempts().len(), 1);
        assert!(source.skipped().is_empty());
    }
}
