//! Cart reconciliation controller.
//!
//! The server is the single source of truth: every successful mutation is
//! followed by a full refetch, and derived values (selected count, subtotal)
//! are recomputed from the fetched lines rather than patched locally.
//!
//! [`CartController`] owns the view state and publishes it on a
//! `tokio::sync::watch` channel. Side effects that live outside the cart
//! (badge refresh, user prompts, session transfer, navigation) are injected
//! through [`CartCollaborators`].

pub mod badge;
pub mod bulk;
pub mod checkout;
pub mod collaborators;
pub mod controller;
pub mod selection;
pub mod summary;
pub mod view;

pub use badge::{BadgeLabel, CountBadge};
pub use bulk::{BulkRemoveReport, RemoveOutcome};
pub use checkout::{
    FileSessionStore, MemorySessionStore, SELECTED_CART_ITEMS_KEY, SessionError, SessionStore,
    read_selected_items, write_selected_items,
};
pub use collaborators::{BadgeRefresher, NoopBadge, Prompter};
pub use controller::{
    BulkRemoveOutcome, CartCollaborators, CartController, CheckoutOutcome, LoadOutcome,
    MutationOutcome,
};
pub use selection::SelectionSet;
pub use summary::{PaymentRow, PaymentSummary, format_won};
pub use view::{CartPhase, CartSummary, CartViewState};
