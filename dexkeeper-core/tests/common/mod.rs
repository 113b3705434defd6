//! Shared fixtures for integration tests
//!
//! Included by several test files through `mod common;`; not every helper
//! is used by every file.

#![allow(dead_code)]

use async_trait::async_trait;
use dexkeeper_core::catalog::{
    display_name_from_api, DefaultDocumentLoader, DocumentLoader, DocumentLocation, Game,
    RemoteCatalog, Section, SpeciesEntry,
};
use dexkeeper_core::CatalogError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn entry(api_name: &str, entry_number: u32, species_id: u32) -> SpeciesEntry {
    SpeciesEntry {
        api_name: api_name.to_string(),
        display_name: display_name_from_api(api_name),
        entry_number,
        species_id,
    }
}

pub fn remote_game(id: &str, sections: &[(&str, &str)]) -> Game {
    Game {
        id: id.to_string(),
        name: id.to_uppercase(),
        local: false,
        sections: sections
            .iter()
            .map(|(section, dex)| Section::remote(section, section, dex))
            .collect(),
    }
}

pub fn local_game(id: &str, sections: &[&str]) -> Game {
    Game {
        id: id.to_string(),
        name: id.to_uppercase(),
        local: true,
        sections: sections
            .iter()
            .map(|section| Section::unsourced(section, section))
            .collect(),
    }
}

pub fn overall_game() -> Game {
    Game {
        id: "overall".to_string(),
        name: "Overall Dex".to_string(),
        local: false,
        sections: vec![Section::unsourced("national", "National Dex")],
    }
}

/// In-memory remote catalog that counts requests
#[derive(Default)]
pub struct MockRemote {
    catalogs: HashMap<String, Vec<SpeciesEntry>>,
    species: HashMap<String, u32>,
    delay: Option<Duration>,
    catalog_fetches: Mutex<HashMap<String, usize>>,
    species_fetches: AtomicUsize,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog_id: &str, entries: Vec<SpeciesEntry>) -> Self {
        for e in &entries {
            self.species.insert(e.api_name.clone(), e.species_id);
        }
        self.catalogs.insert(catalog_id.to_string(), entries);
        self
    }

    pub fn with_species(mut self, api_name: &str, species_id: u32) -> Self {
        self.species.insert(api_name.to_string(), species_id);
        self
    }

    /// Hold every catalog response open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self, catalog_id: &str) -> usize {
        self.catalog_fetches
            .lock()
            .unwrap()
            .get(catalog_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.catalog_fetches.lock().unwrap().values().sum()
    }

    pub fn species_fetches(&self) -> usize {
        self.species_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteCatalog for MockRemote {
    async fn fetch_catalog(&self, catalog_id: &str) -> Result<Vec<SpeciesEntry>, CatalogError> {
        *self
            .catalog_fetches
            .lock()
            .unwrap()
            .entry(catalog_id.to_string())
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.catalogs
            .get(catalog_id)
            .cloned()
            .ok_or_else(|| CatalogError::SourceUnreachable {
                location: catalog_id.to_string(),
                reason: "HTTP 404".to_string(),
            })
    }

    async fn fetch_species_id(&self, api_name: &str) -> Result<u32, CatalogError> {
        self.species_fetches.fetch_add(1, Ordering::SeqCst);
        self.species
            .get(api_name)
            .copied()
            .ok_or_else(|| CatalogError::SourceUnreachable {
                location: format!("pokemon-species/{api_name}"),
                reason: "HTTP 404".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Default loader that records every location it is asked for
pub struct RecordingLoader {
    inner: DefaultDocumentLoader,
    attempts: Mutex<Vec<DocumentLocation>>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self {
            inner: DefaultDocumentLoader::new(5, "dexkeeper-tests").unwrap(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<DocumentLocation> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentLoader for RecordingLoader {
    async fn load(&self, location: &DocumentLocation) -> Result<String, CatalogError> {
        self.attempts.lock().unwrap().push(location.clone());
        self.inner.load(location).await
    }
}

/// A valid local document with the given sections of `(id, entries)`
pub fn local_document_json(sections: &[(&str, Vec<SpeciesEntry>)]) -> String {
    let sections: Vec<_> = sections
        .iter()
        .map(|(id, pokemon)| {
            serde_json::json!({
                "id": id,
                "name": id,
                "pokemon": pokemon,
            })
        })
        .collect();

    serde_json::json!({ "gameId": "gen10-lza", "sections": sections }).to_string()
}
