//! dexkeeper core library exports

pub mod catalog;
pub mod completion;
pub mod config;
pub mod error;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{CatalogError, StoreError, TrackerError};
pub use tracker::{DexTracker, SectionView};
