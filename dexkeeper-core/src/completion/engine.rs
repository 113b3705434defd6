//! Completion engine - the single mutation path for completion state

use std::sync::Arc;
use tracing::debug;

use super::store::{CompletionSnapshot, CompletionStore};
use super::{CompletionRecord, CompletionState, Mode, Progress};
use crate::catalog::SpeciesEntry;
use crate::error::StoreError;

/// Reads and writes completion state through a [`CompletionStore`]
///
/// Nothing is cached between calls: another actor may change the store,
/// so every operation reads a fresh snapshot first.
#[derive(Clone)]
pub struct CompletionEngine {
    store: Arc<dyn CompletionStore>,
}

impl CompletionEngine {
    pub fn new(store: Arc<dyn CompletionStore>) -> Self {
        Self { store }
    }

    /// The backing store
    pub fn store(&self) -> &Arc<dyn CompletionStore> {
        &self.store
    }

    /// Fresh snapshot of every record
    pub async fn snapshot(&self) -> Result<CompletionSnapshot, StoreError> {
        self.store.snapshot().await
    }

    /// Count entries of `list` complete in `mode`
    pub async fn progress(&self, list: &[SpeciesEntry], mode: Mode) -> Result<Progress, StoreError> {
        if list.is_empty() {
            return Ok(Progress::default());
        }

        let snapshot = self.store.snapshot().await?;
        Ok(Progress::tally(list, &snapshot, mode))
    }

    /// Toggle one species in `mode` and write the corrected record back
    ///
    /// Returns the new state.
    pub async fn toggle(&self, api_name: &str, mode: Mode) -> Result<CompletionState, StoreError> {
        let snapshot = self.store.snapshot().await?;
        let current = snapshot.record(api_name);
        let next = current.toggled(mode);

        debug!(
            "Toggle {} ({}): {:?} → {:?} via {} store",
            api_name,
            mode,
            current,
            next,
            self.store.name()
        );

        self.store.put(api_name, next).await?;
        Ok(CompletionState::from(next))
    }
}
