//! Tracker - the long-lived engine instance
//!
//! Owns every piece of process-lifetime state: the section cache, the
//! shared local document, the overall union and the per-game display
//! modes. All of it is populated once and read many times; nothing here is
//! global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::catalog::{
    CatalogCache, CatalogSource, DefaultDocumentLoader, DocumentLoader, Game, LocalDocumentSource,
    Numbering, OverallDex, PokeApiClient, RemoteCatalog, Section, SectionCatalog, SectionSource,
    SpeciesEntry, UnionBuilder,
};
use crate::completion::{
    CompletionEngine, CompletionSnapshot, CompletionState, CompletionStore, Mode, Progress,
};
use crate::config::TrackerConfig;
use crate::error::{CatalogError, TrackerError};

/// A resolved list ready for presentation
#[derive(Debug, Clone)]
pub struct SectionView {
    pub game: Game,
    pub section: Section,
    pub mode: Mode,
    pub numbering: Numbering,
    list: ViewList,
}

#[derive(Debug, Clone)]
enum ViewList {
    Section(SectionCatalog),
    Overall(OverallDex),
}

impl SectionView {
    /// Entries in display order
    pub fn entries(&self) -> &[SpeciesEntry] {
        match &self.list {
            ViewList::Section(catalog) => catalog.entries(),
            ViewList::Overall(dex) => dex.entries(),
        }
    }

    /// Why the list is empty, if it is empty because resolution failed
    pub fn diagnostic(&self) -> Option<&CatalogError> {
        match &self.list {
            ViewList::Section(catalog) => catalog.diagnostic(),
            ViewList::Overall(_) => None,
        }
    }

    /// Whether this is the overall view
    pub fn is_overall(&self) -> bool {
        matches!(self.list, ViewList::Overall(_))
    }
}

/// The engine instance
pub struct DexTracker {
    config: TrackerConfig,
    source: CatalogSource,
    cache: CatalogCache,
    overall: OnceCell<OverallDex>,
    modes: Mutex<HashMap<String, Mode>>,
    completion: CompletionEngine,
}

impl DexTracker {
    /// Create a tracker using the HTTP catalog client and default loader
    pub fn new(config: TrackerConfig, store: Arc<dyn CompletionStore>) -> anyhow::Result<Self> {
        let remote = PokeApiClient::new(&config.api_base_url, config.timeout_seconds, &config.user_agent)?;
        let loader = DefaultDocumentLoader::new(config.timeout_seconds, &config.user_agent)?;
        Ok(Self::with_backends(
            config,
            Arc::new(remote),
            Arc::new(loader),
            store,
        ))
    }

    /// Create a tracker with explicit backends
    pub fn with_backends(
        config: TrackerConfig,
        remote: Arc<dyn RemoteCatalog>,
        loader: Arc<dyn DocumentLoader>,
        store: Arc<dyn CompletionStore>,
    ) -> Self {
        let local = LocalDocumentSource::new(loader, config.local_document.clone());

        Self {
            source: CatalogSource::new(remote, local),
            cache: CatalogCache::new(),
            overall: OnceCell::new(),
            modes: Mutex::new(HashMap::new()),
            completion: CompletionEngine::new(store),
            config,
        }
    }

    /// Build the overall union; call once at startup
    pub async fn initialize(&self) -> &OverallDex {
        let overall = self.overall().await;
        info!(
            "Tracker ready: {} games, {} species overall",
            self.config.games.len(),
            overall.len()
        );
        overall
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn games(&self) -> &[Game] {
        &self.config.games
    }

    pub fn game(&self, id: &str) -> Result<&Game, TrackerError> {
        self.config
            .game(id)
            .ok_or_else(|| TrackerError::UnknownGame(id.to_string()))
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn completion(&self) -> &CompletionEngine {
        &self.completion
    }

    /// The overall union, built on first use
    ///
    /// Concurrent first calls share one build.
    pub async fn overall(&self) -> &OverallDex {
        self.overall
            .get_or_init(|| async {
                UnionBuilder::new(&self.source, &self.cache)
                    .build(&self.config.games)
                    .await
            })
            .await
    }

    /// Current display mode of a game (normal until toggled)
    pub fn mode(&self, game_id: &str) -> Mode {
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(game_id)
            .copied()
            .unwrap_or_default()
    }

    /// Switch a game's display mode
    pub fn set_mode(&self, game_id: &str, mode: Mode) -> Result<(), TrackerError> {
        self.game(game_id)?;
        debug!("Display mode for '{}' set to {}", game_id, mode);
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(game_id.to_string(), mode);
        Ok(())
    }

    fn locate(&self, game_id: &str, section_id: Option<&str>) -> Result<(&Game, &Section), TrackerError> {
        let game = self.game(game_id)?;
        let section = match section_id {
            Some(id) => game.section(id),
            None => game.default_section(),
        };

        let section = section.ok_or_else(|| TrackerError::UnknownSection {
            game: game_id.to_string(),
            section: section_id.unwrap_or_default().to_string(),
        })?;

        Ok((game, section))
    }

    /// Resolve the list shown for a game section
    ///
    /// `None` selects the game's first section. Synthetic sections show the
    /// overall union.
    pub async fn section_view(&self, game_id: &str, section_id: Option<&str>) -> Result<SectionView, TrackerError> {
        let (game, section) = self.locate(game_id, section_id)?;

        let (list, numbering) = match game.source_of(section) {
            SectionSource::Synthetic => (
                ViewList::Overall(self.overall().await.clone()),
                Numbering::National,
            ),
            _ => (
                ViewList::Section(self.cache.resolve(&self.source, game, section).await),
                Numbering::Regional,
            ),
        };

        Ok(SectionView {
            game: game.clone(),
            section: section.clone(),
            mode: self.mode(game_id),
            numbering,
            list,
        })
    }

    /// Progress of a view in its game's current mode
    pub async fn progress(&self, view: &SectionView) -> Result<Progress, TrackerError> {
        Ok(self.completion.progress(view.entries(), view.mode).await?)
    }

    /// Fresh completion snapshot for rendering
    pub async fn snapshot(&self) -> Result<CompletionSnapshot, TrackerError> {
        Ok(self.completion.snapshot().await?)
    }

    /// Toggle a species in the given game's current mode
    pub async fn toggle(&self, game_id: &str, api_name: &str) -> Result<CompletionState, TrackerError> {
        self.game(game_id)?;
        Ok(self.completion.toggle(api_name, self.mode(game_id)).await?)
    }
}
