//! Ordered-candidate resolution
//!
//! Tries each candidate in order and stops at the first one whose attempt
//! succeeds (the attempt itself is responsible for any structural check).
//! Failures are accumulated so the final error names every candidate
//! tried, in order.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

use crate::error::{Attempt, CatalogError};

/// A value produced by one of the candidates
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// Position of the winning candidate
    pub index: usize,

    /// The resolved value
    pub value: T,

    /// Candidates that failed before the winner
    pub failures: Vec<Attempt>,
}

/// Resolve the first candidate that succeeds
///
/// Later candidates are never attempted once one succeeds. When every
/// candidate fails the result is [`CatalogError::Exhausted`] carrying each
/// failure in order.
pub async fn first_success<'c, C, T, F, Fut>(
    candidates: &'c [C],
    mut attempt: F,
) -> Result<Resolved<T>, CatalogError>
where
    C: Display,
    F: FnMut(&'c C) -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match attempt(candidate).await {
            Ok(value) => {
                debug!("Resolved candidate {} ({})", index, candidate);
                return Ok(Resolved {
                    index,
                    value,
                    failures,
                });
            }
            Err(error) => {
                warn!("Candidate {} failed: {}", candidate, error);
                failures.push(Attempt {
                    candidate: candidate.to_string(),
                    error,
                });
            }
        }
    }

    Err(CatalogError::Exhausted { attempts: failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unreachable(candidate: &str) -> CatalogError {
        CatalogError::SourceUnreachable {
            location: candidate.to_string(),
            reason: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let result = first_success(&["a", "b"], |c| {
            let c = c.to_string();
            async move { Ok::<_, CatalogError>(c) }
        })
        .await
        .unwrap();

        assert_eq!(result.index, 0);
        assert_eq!(result.value, "a");
        assert!(result.failures.is_empty());
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = AtomicUsize::new(0);

        let result = first_success(&["a", "b", "c", "d"], |c| {
            calls.fetch_add(1, Ordering::SeqCst);
            let c = c.to_string();
            async move {
                if c == "c" || c == "d" {
                    Ok(c)
                } else {
                    Err(unreachable(&c))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.value, "c");
        assert_eq!(result.index, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].candidate, "a");
        assert_eq!(result.failures[1].candidate, "b");
    }

    #[tokio::test]
    async fn test_all_fail_accumulates_in_order() {
        let err = first_success(&["x", "y"], |c| {
            let c = c.to_string();
            async move { Err::<(), _>(unreachable(&c)) }
        })
        .await
        .unwrap_err();

        let attempts = err.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].candidate, "x");
        assert_eq!(attempts[1].candidate, "y");
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let candidates: [&str; 0] = [];
        let err = first_success(&candidates, |_| async { Ok::<_, CatalogError>(()) })
            .await
            .unwrap_err();
        assert!(err.attempts().is_empty());
    }
}
