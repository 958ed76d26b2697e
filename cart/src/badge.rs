//! Header cart-count badge.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mosi_api_client::{CartApi, Decoded};
use tokio::sync::watch;

use crate::collaborators::BadgeRefresher;

/// Counts above this render as `99+`.
pub const BADGE_MAX: u64 = 99;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeLabel {
    #[default]
    Hidden,
    Count(u64),
    Overflow,
}

impl BadgeLabel {
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => Self::Hidden,
            n if n > BADGE_MAX => Self::Overflow,
            n => Self::Count(n),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

impl fmt::Display for BadgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => Ok(()),
            Self::Count(n) => write!(f, "{n}"),
            Self::Overflow => write!(f, "{BADGE_MAX}+"),
        }
    }
}

/// [`BadgeRefresher`] backed by `GET /cart/count`.
pub struct CountBadge {
    api: Arc<dyn CartApi>,
    label: watch::Sender<BadgeLabel>,
}

impl CountBadge {
    pub fn new(api: Arc<dyn CartApi>) -> Self {
        let (label, _) = watch::channel(BadgeLabel::Hidden);
        Self { api, label }
    }

    pub fn label(&self) -> BadgeLabel {
        *self.label.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BadgeLabel> {
        self.label.subscribe()
    }
}

#[async_trait]
impl BadgeRefresher for CountBadge {
    async fn refresh(&self) {
        match self.api.item_count().await {
            Ok(Decoded::Ok(count)) => {
                let label = BadgeLabel::from_count(count.count);
                tracing::debug!(count = count.count, %label, "cart badge refreshed");
                self.label.send_replace(label);
            }
            Ok(Decoded::Err(failure)) => {
                tracing::warn!(category = %failure.category, error = %failure, "cart badge refresh failed");
            }
            Ok(Decoded::Unauthenticated) => {
                tracing::warn!("cart badge refresh requires login");
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart badge refresh failed");
            }
        }
    }
}
