//! Sequential bulk removal with per-item outcomes.

use mosi_api_client::{ApiFailure, CartApi, CartKey, Decoded};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Failed(ApiFailure),
}

/// Result of removing a batch of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRemoveReport {
    requested: usize,
    outcomes: Vec<(CartKey, RemoveOutcome)>,
    aborted_by_auth: bool,
}

impl BulkRemoveReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            outcomes: Vec::with_capacity(requested),
            aborted_by_auth: false,
        }
    }

    pub fn record(&mut self, key: CartKey, outcome: RemoveOutcome) {
        self.outcomes.push((key, outcome));
    }

    pub(crate) fn mark_unauthenticated(&mut self) {
        self.aborted_by_auth = true;
    }

    /// Outcomes in the order the removals were issued.
    pub fn outcomes(&self) -> &[(CartKey, RemoveOutcome)] {
        &self.outcomes
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn removed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RemoveOutcome::Removed))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.attempted() - self.removed_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CartKey, &ApiFailure)> {
        self.outcomes.iter().filter_map(|(key, outcome)| match outcome {
            RemoveOutcome::Failed(failure) => Some((key, failure)),
            RemoveOutcome::Removed => None,
        })
    }

    /// Every requested key was removed.
    pub fn is_complete(&self) -> bool {
        !self.aborted_by_auth && self.removed_count() == self.requested
    }

    /// A removal answered 401 and the remaining keys were not attempted.
    pub fn aborted_by_auth(&self) -> bool {
        self.aborted_by_auth
    }

    pub fn message(&self) -> String {
        let removed = self.removed_count();
        if self.aborted_by_auth {
            return format!(
                "Login required. {removed} of {} items were removed.",
                self.requested
            );
        }
        if self.is_complete() {
            return format!("{removed} items were removed.");
        }
        let first = self
            .failures()
            .next()
            .map(|(key, failure)| format!(" ({key}: {failure})"))
            .unwrap_or_default();
        format!(
            "{removed} of {} items were removed; {} failed{first}.",
            self.requested,
            self.failed_count()
        )
    }
}

/// Removes `keys` one at a time, in order.
///
/// Individual failures are recorded and the loop continues; a 401 stops it.
pub async fn remove_sequentially(api: &dyn CartApi, keys: &[CartKey]) -> BulkRemoveReport {
    let mut report = BulkRemoveReport::new(keys.len());
    for key in keys {
        let outcome = match api.remove_item(key).await {
            Ok(Decoded::Ok(())) => RemoveOutcome::Removed,
            Ok(Decoded::Err(failure)) => {
                tracing::warn!(product_id = key.product_id, option = %key.option_type, error = %failure, "bulk remove item failed");
                RemoveOutcome::Failed(failure)
            }
            Ok(Decoded::Unauthenticated) => {
                tracing::info!(%key, "bulk remove stopped: login required");
                report.mark_unauthenticated();
                break;
            }
            Err(err) => {
                tracing::error!(%key, error = %err, "bulk remove request failed");
                RemoveOutcome::Failed(err.into_failure())
            }
        };
        report.record(key.clone(), outcome);
    }
    report
}
