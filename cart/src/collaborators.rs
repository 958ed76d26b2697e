//! Capabilities the controller needs from its surroundings.

use async_trait::async_trait;

/// Refreshes the header cart-count badge after a mutation.
///
/// Best-effort: implementations swallow their own failures.
#[async_trait]
pub trait BadgeRefresher: Send + Sync {
    async fn refresh(&self);
}

/// Badge refresher for contexts without a badge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBadge;

#[async_trait]
impl BadgeRefresher for NoopBadge {
    async fn refresh(&self) {}
}

/// User-facing notices and confirmations.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Transient notice; never blocks.
    fn notify(&self, message: &str);

    /// Guard for irreversible actions. `false` aborts the action.
    async fn confirm(&self, question: &str) -> bool;
}
