//! Section resolution
//!
//! [`CatalogSource`] picks the remote or local strategy for a section and
//! never fails outward: an unusable source yields an empty list that keeps
//! the error as its diagnostic.

use std::sync::Arc;
use tracing::{debug, warn};

use super::entry::SpeciesEntry;
use super::game::{Game, Section, SectionSource};
use super::local::LocalDocumentSource;
use super::remote::RemoteCatalog;
use crate::error::CatalogError;

/// A resolved section list
///
/// Cloning is cheap: the entries are shared.
#[derive(Debug, Clone)]
pub struct SectionCatalog {
    entries: Arc<Vec<SpeciesEntry>>,
    diagnostic: Option<CatalogError>,
}

impl SectionCatalog {
    /// A successfully resolved list (possibly legitimately empty)
    pub fn resolved(entries: Vec<SpeciesEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
            diagnostic: None,
        }
    }

    /// An empty list standing in for a failed resolution
    pub fn failed(error: CatalogError) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            diagnostic: Some(error),
        }
    }

    /// Entries in source order
    pub fn entries(&self) -> &[SpeciesEntry] {
        &self.entries
    }

    /// Shared handle to the entries
    pub fn shared(&self) -> &Arc<Vec<SpeciesEntry>> {
        &self.entries
    }

    /// Why this list is empty, when it is empty because of a failure
    pub fn diagnostic(&self) -> Option<&CatalogError> {
        self.diagnostic.as_ref()
    }

    /// Whether this list is the product of a failed resolution
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves section lists from the remote catalog or the local document
pub struct CatalogSource {
    remote: Arc<dyn RemoteCatalog>,
    local: LocalDocumentSource,
}

impl CatalogSource {
    pub fn new(remote: Arc<dyn RemoteCatalog>, local: LocalDocumentSource) -> Self {
        Self { remote, local }
    }

    /// The remote backend (also used for species lookups)
    pub fn remote(&self) -> &Arc<dyn RemoteCatalog> {
        &self.remote
    }

    /// The shared local document source
    pub fn local(&self) -> &LocalDocumentSource {
        &self.local
    }

    /// Resolve one section of `game`
    pub async fn resolve(&self, game: &Game, section: &Section) -> SectionCatalog {
        self.resolve_source(game.source_of(section)).await
    }

    /// Resolve a section given its source
    pub async fn resolve_source(&self, source: SectionSource<'_>) -> SectionCatalog {
        match source {
            SectionSource::Remote { catalog_id } => self.resolve_remote(Some(catalog_id)).await,
            SectionSource::Local {
                game_id,
                section_id,
            } => self.resolve_local(game_id, section_id).await,
            SectionSource::Synthetic => self.resolve_remote(None).await,
        }
    }

    /// Resolve a remote catalog; an absent identifier resolves to empty
    pub async fn resolve_remote(&self, catalog_id: Option<&str>) -> SectionCatalog {
        let Some(catalog_id) = catalog_id else {
            return SectionCatalog::resolved(Vec::new());
        };

        debug!("Resolving remote catalog '{}' via {}", catalog_id, self.remote.name());
        match self.remote.fetch_catalog(catalog_id).await {
            Ok(entries) => SectionCatalog::resolved(entries),
            Err(e) => {
                let e = e.into_unreachable(catalog_id);
                warn!("Remote catalog '{}' unavailable: {}", catalog_id, e);
                SectionCatalog::failed(e)
            }
        }
    }

    /// Resolve a section of the shared local document
    pub async fn resolve_local(&self, game_id: &str, section_id: &str) -> SectionCatalog {
        match self.local.section(game_id, section_id).await {
            Ok(entries) => SectionCatalog::resolved(entries),
            Err(e) => {
                debug!(
                    "Local section '{}/{}' degraded to empty: {}",
                    game_id, section_id, e
                );
                SectionCatalog::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_catalog_is_distinguishable() {
        let ok = SectionCatalog::resolved(Vec::new());
        assert!(ok.is_empty());
        assert!(!ok.is_degraded());

        let failed = SectionCatalog::failed(CatalogError::SourceUnreachable {
            location: "kanto".to_string(),
            reason: "HTTP 503".to_string(),
        });
        assert!(failed.is_empty());
        assert!(failed.is_degraded());
        assert_eq!(failed.diagnostic().unwrap().to_string(), "kanto → HTTP 503");
    }

    #[test]
    fn test_clones_share_entries() {
        let catalog = SectionCatalog::resolved(vec![SpeciesEntry {
            api_name: "pikachu".to_string(),
            display_name: "Pikachu".to_string(),
            entry_number: 25,
            species_id: 25,
        }]);
        let copy = catalog.clone();
        assert!(Arc::ptr_eq(catalog.shared(), copy.shared()));
        assert_eq!(copy.len(), 1);
    }
}
