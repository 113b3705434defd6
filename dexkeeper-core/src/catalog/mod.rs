//! Species catalogs - resolution, caching and the overall union
//!
//! # Overview
//!
//! Each configured game exposes one or more sections. A section's species
//! list comes from one of:
//! - the remote catalog provider, keyed by catalog identifier
//! - the shared local document, keyed by game and section identifier
//! - nowhere (the synthetic overall section, filled by the union)
//!
//! # Architecture
//!
//! ```text
//! Game/Section config
//!        │
//!        ▼
//! CatalogCache ──miss──▶ CatalogSource ──▶ RemoteCatalog (pokedex/{id})
//!        │                     │
//!        │                     └─────────▶ LocalDocumentSource
//!        │                                   └─ fallback over candidates
//!        ▼
//! UnionBuilder ──▶ OverallDex (dedup by apiName, sorted by speciesId)
//! ```

mod builder;
mod cache;
mod entry;
mod fallback;
mod game;
mod local;
mod remote;
mod source;
mod union;

pub use builder::{api_name_for, parse_raw_dex, LocalDocumentBuilder, RawEntry};
pub use cache::{CacheKey, CatalogCache};
pub use entry::{display_name_from_api, species_id_from_url, Numbering, SpeciesEntry};
pub use fallback::{first_success, Resolved};
pub use game::{Game, Section, SectionSource};
pub use local::{
    DefaultDocumentLoader, DocumentLoader, DocumentLocation, LocalDocument, LocalDocumentSource,
    LocalSection,
};
pub use remote::{
    CatalogRecord, CatalogResponse, PokeApiClient, RemoteCatalog, SpeciesReference,
    DEFAULT_API_BASE_URL,
};
pub use source::{CatalogSource, SectionCatalog};
pub use union::{DegradedSection, OverallDex, UnionAccumulator, UnionBuilder};
