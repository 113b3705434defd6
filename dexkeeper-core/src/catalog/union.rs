//! The overall catalog: deduplicated union of every section of every game
//!
//! Games are visited in configured order, sections within a game in
//! configured order. The first occurrence of an `apiName` wins; later
//! occurrences (regional variants listed twice, base forms shared by two
//! generations) are dropped even if their metadata differs. The result is
//! then ordered by global species identifier.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::cache::CatalogCache;
use super::entry::SpeciesEntry;
use super::game::{Game, SectionSource};
use super::source::CatalogSource;
use crate::error::CatalogError;

/// A section that contributed nothing to the union because it failed
#[derive(Debug, Clone)]
pub struct DegradedSection {
    pub game_id: String,
    pub section_id: String,
    pub error: CatalogError,
}

/// The built overall catalog
#[derive(Debug, Clone)]
pub struct OverallDex {
    entries: Arc<Vec<SpeciesEntry>>,
    degraded: Vec<DegradedSection>,
}

impl OverallDex {
    /// Entries ordered by species identifier, one per `apiName`
    pub fn entries(&self) -> &[SpeciesEntry] {
        &self.entries
    }

    /// Shared handle to the entries
    pub fn shared(&self) -> &Arc<Vec<SpeciesEntry>> {
        &self.entries
    }

    /// Sections whose failure left gaps in the union
    pub fn degraded(&self) -> &[DegradedSection] {
        &self.degraded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Insertion-ordered first-occurrence-wins merge
#[derive(Debug, Default)]
pub struct UnionAccumulator {
    seen: IndexMap<String, SpeciesEntry>,
}

impl UnionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section list; entries whose `apiName` is already present are skipped
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = &'a SpeciesEntry>) {
        for entry in entries {
            if !self.seen.contains_key(&entry.api_name) {
                self.seen.insert(entry.api_name.clone(), entry.clone());
            }
        }
    }

    /// Finish: order by species identifier
    ///
    /// The sort is stable, so entries sharing an identifier keep insertion order.
    pub fn finish(self) -> Vec<SpeciesEntry> {
        let mut entries: Vec<SpeciesEntry> = self.seen.into_values().collect();
        entries.sort_by_key(|e| e.species_id);
        entries
    }
}

/// Builds the overall catalog from every configured section
pub struct UnionBuilder<'a> {
    source: &'a CatalogSource,
    cache: &'a CatalogCache,
}

impl<'a> UnionBuilder<'a> {
    pub fn new(source: &'a CatalogSource, cache: &'a CatalogCache) -> Self {
        Self { source, cache }
    }

    /// Resolve every non-synthetic section and merge
    ///
    /// A section that fails contributes nothing; the build itself never fails.
    pub async fn build(&self, games: &[Game]) -> OverallDex {
        let mut union = UnionAccumulator::new();
        let mut degraded = Vec::new();
        let mut sections = 0usize;

        for game in games {
            for section in &game.sections {
                if matches!(game.source_of(section), SectionSource::Synthetic) {
                    continue;
                }

                let catalog = self.cache.resolve(self.source, game, section).await;
                sections += 1;

                if let Some(error) = catalog.diagnostic() {
                    warn!(
                        "Section '{}/{}' contributes nothing to the overall dex: {}",
                        game.id, section.id, error
                    );
                    degraded.push(DegradedSection {
                        game_id: game.id.clone(),
                        section_id: section.id.clone(),
                        error: error.clone(),
                    });
                }

                union.extend(catalog.entries());
            }
        }

        let entries = union.finish();
        info!(
            "Built overall dex: {} species from {} sections ({} degraded)",
            entries.len(),
            sections,
            degraded.len()
        );

        OverallDex {
            entries: Arc::new(entries),
            degraded,
        }
    }
}
