//! Remote species catalog backend
//!
//! The remote provider serves one paginated catalog per identifier
//! (`pokedex/{id}`) and one record per species (`pokemon-species/{name}`).
//! The [`RemoteCatalog`] trait keeps the HTTP client swappable so the
//! engine can be exercised without a network.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::entry::SpeciesEntry;
use crate::error::CatalogError;

/// Default remote catalog endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Trait for remote catalog providers
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch and parse one catalog, preserving source order
    async fn fetch_catalog(&self, catalog_id: &str) -> Result<Vec<SpeciesEntry>, CatalogError>;

    /// Look up the global species identifier for an identity key
    async fn fetch_species_id(&self, api_name: &str) -> Result<u32, CatalogError>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// `pokedex/{id}` response
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    pub pokemon_entries: Vec<CatalogRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogRecord {
    pub entry_number: u32,
    pub pokemon_species: SpeciesReference,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesReference {
    pub name: String,
    pub url: String,
}

/// `pokemon-species/{name}` response (only the identity is needed)
#[derive(Debug, Deserialize)]
struct SpeciesResponse {
    id: u32,
}

impl CatalogResponse {
    /// Convert wire records into species entries
    ///
    /// A single record without a numeric identity aborts the whole catalog.
    pub fn into_entries(self) -> Result<Vec<SpeciesEntry>, CatalogError> {
        self.pokemon_entries
            .into_iter()
            .map(|record| {
                SpeciesEntry::from_remote(
                    record.entry_number,
                    &record.pokemon_species.name,
                    &record.pokemon_species.url,
                )
            })
            .collect()
    }
}

/// HTTP client for the public species API
pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    /// Create a client against `base_url` with a request timeout
    pub fn new(base_url: &str, timeout_seconds: u64, user_agent: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, CatalogError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::SourceUnreachable {
                location: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CatalogError::SourceUnreachable {
                location: url.to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::ShapeMismatch {
                location: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RemoteCatalog for PokeApiClient {
    async fn fetch_catalog(&self, catalog_id: &str) -> Result<Vec<SpeciesEntry>, CatalogError> {
        let url = self.url_for(&format!("pokedex/{catalog_id}"));
        debug!("Fetching remote catalog {}", url);

        let response: CatalogResponse = self.get_json(&url).await?;
        let entries = response.into_entries()?;

        debug!("Remote catalog '{}': {} entries", catalog_id, entries.len());
        Ok(entries)
    }

    async fn fetch_species_id(&self, api_name: &str) -> Result<u32, CatalogError> {
        let url = self.url_for(&format!("pokemon-species/{api_name}"));
        let response: SpeciesResponse = self.get_json(&url).await?;
        Ok(response.id)
    }

    fn name(&self) -> &'static str {
        "pokeapi"
    }
}

/// Ensure exactly one trailing slash so paths can be appended
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
