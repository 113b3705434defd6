//! Error types for catalog resolution and completion storage

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that can occur while resolving a species catalog
///
/// None of these escape the catalog layer as a fault: a section that fails
/// resolves to an empty list and keeps the error as its diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure or non-success status from a catalog source
    #[error("{location} → {reason}")]
    SourceUnreachable { location: String, reason: String },

    /// The response parsed but failed the minimal structural check
    #[error("{location} → {reason}")]
    ShapeMismatch { location: String, reason: String },

    /// A remote entry carried a species reference without a numeric identity
    #[error("Could not parse a species identifier from '{url}'")]
    ParseFailure { url: String },

    /// Every fallback candidate failed
    #[error("{}", Attempts(.attempts))]
    Exhausted { attempts: Vec<Attempt> },
}

/// One failed candidate in an ordered fallback resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub candidate: String,
    pub error: CatalogError,
}

struct Attempts<'a>(&'a [Attempt]);

impl fmt::Display for Attempts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("No candidate locations configured");
        }

        let tried: Vec<&str> = self.0.iter().map(|a| a.candidate.as_str()).collect();
        write!(f, "Tried: {}.", tried.join(", "))?;
        for attempt in self.0 {
            write!(f, "\n  - {}", attempt.error)?;
        }
        Ok(())
    }
}

impl CatalogError {
    /// Collapse a parse failure into an unreachable source for `location`
    ///
    /// An entry with no numeric identity makes the whole section unusable, so
    /// callers see it the same way as a source that never answered.
    pub fn into_unreachable(self, location: &str) -> Self {
        match self {
            CatalogError::ParseFailure { .. } => CatalogError::SourceUnreachable {
                location: location.to_string(),
                reason: self.to_string(),
            },
            other => other,
        }
    }

    /// Candidates attempted before giving up, in order
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            CatalogError::Exhausted { attempts } => attempts,
            _ => &[],
        }
    }
}

/// Completion store failures
///
/// These always propagate to the caller: losing a toggle silently is worse
/// than surfacing the failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Completion store unavailable at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// The store answered with a non-success status
    #[error("Completion store rejected {operation}: HTTP {status}")]
    Rejected { operation: String, status: u16 },

    /// Failed to read or write the backing file
    #[error("Failed to access completion file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored state could not be encoded or decoded
    #[error("Completion state is not valid JSON")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the tracker façade
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unknown game '{0}'")]
    UnknownGame(String),

    #[error("Game '{game}' has no section '{section}'")]
    UnknownSection { game: String, section: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
