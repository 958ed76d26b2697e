//! Cart reconciliation controller.

use std::sync::Arc;

use mosi_api_client::{
    ApiFailure, ApiResult, CartApi, CartKey, CartLine, Decoded, Navigator, Route,
};
use tokio::sync::watch;

use crate::bulk::{BulkRemoveReport, remove_sequentially};
use crate::checkout::{SessionError, SessionStore, write_selected_items};
use crate::collaborators::{BadgeRefresher, Prompter};
use crate::selection::SelectionSet;
use crate::view::{CartPhase, CartSummary, CartViewState};

const BUSY_MESSAGE: &str = "Another cart update is still in progress.";
const NOTHING_TO_REMOVE_MESSAGE: &str = "Select the items to remove.";
const NOTHING_TO_ORDER_MESSAGE: &str = "Select the items to order.";
const CHECKOUT_FAILED_MESSAGE: &str = "An error occurred while preparing the order.";

/// User-facing text for one kind of mutation.
struct FailureText {
    /// Shown when the server rejected the request without a message.
    rejected: &'static str,
    /// Shown when no response arrived.
    network: &'static str,
}

const QUANTITY_TEXT: FailureText = FailureText {
    rejected: "Failed to change the quantity.",
    network: "An error occurred while changing the quantity.",
};

const REMOVE_TEXT: FailureText = FailureText {
    rejected: "Failed to remove the item.",
    network: "An error occurred while removing the item.",
};

const ADD_TEXT: FailureText = FailureText {
    rejected: "Failed to add the item to the cart.",
    network: "A network error occurred. Please try again.",
};

const CLEAR_TEXT: FailureText = FailureText {
    rejected: "Failed to clear the cart.",
    network: "An error occurred while clearing the cart.",
};

/// External capabilities, injected at construction.
#[derive(Clone)]
pub struct CartCollaborators {
    pub api: Arc<dyn CartApi>,
    pub badge: Arc<dyn BadgeRefresher>,
    pub prompter: Arc<dyn Prompter>,
    pub session: Arc<dyn SessionStore>,
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Phase is now `Failed`; the message is kept in `load_error`.
    Failed(ApiFailure),
    /// Navigation to login already happened; state untouched.
    Unauthenticated,
    /// A mutation is in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Server accepted the change and the cart was refetched.
    Applied,
    /// Rejected by the server or a local precondition; the user was notified.
    Rejected(ApiFailure),
    /// User declined the confirmation. No request was sent.
    Declined,
    Unauthenticated,
    /// Another mutation is in flight. No request was sent.
    Busy,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkRemoveOutcome {
    NothingSelected,
    Declined,
    Busy,
    Completed(BulkRemoveReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    NothingSelected,
    Busy,
    /// Lines written to the session store; navigation to the order page done.
    HandedOff(Vec<CartLine>),
}

/// Resets `is_mutating` when dropped, on every exit path.
struct MutatingGuard<'a> {
    state: &'a watch::Sender<CartViewState>,
}

impl Drop for MutatingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| {
            state.is_mutating = false;
            if state.phase == CartPhase::Mutating {
                state.phase = CartPhase::Ready;
            }
        });
    }
}

fn settle(result: Result<(), MutationOutcome>) -> MutationOutcome {
    match result {
        Ok(()) => MutationOutcome::Applied,
        Err(outcome) => outcome,
    }
}

/// Owns the cart view state and reconciles it against the server.
pub struct CartController {
    collaborators: CartCollaborators,
    state: watch::Sender<CartViewState>,
}

impl CartController {
    pub fn new(collaborators: CartCollaborators) -> Self {
        let (state, _) = watch::channel(CartViewState::default());
        Self {
            collaborators,
            state,
        }
    }

    /// Receives every state change, including the `Mutating` phase.
    pub fn subscribe(&self) -> watch::Receiver<CartViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> CartViewState {
        self.state.borrow().clone()
    }

    pub fn summary(&self) -> CartSummary {
        self.state.borrow().summary()
    }

    pub fn is_mutating(&self) -> bool {
        self.state.borrow().is_mutating
    }

    /// Fetch the cart and select every available line.
    pub async fn load(&self) -> LoadOutcome {
        if self.is_mutating() {
            return LoadOutcome::Busy;
        }
        let (previous_phase, previous_error) = {
            let state = self.state.borrow();
            (state.phase, state.load_error.clone())
        };
        self.state.send_modify(|state| {
            state.phase = CartPhase::Loading;
            state.load_error = None;
        });

        let outcome = self.refetch().await;
        if outcome == LoadOutcome::Unauthenticated {
            self.state.send_modify(|state| {
                state.phase = previous_phase;
                state.load_error = previous_error;
            });
        }
        outcome
    }

    /// Manual recovery from `Failed`.
    pub async fn retry(&self) -> LoadOutcome {
        tracing::debug!("retrying cart load");
        self.load().await
    }

    /// A quantity of 0 lets the server delete the line.
    pub async fn change_quantity(&self, key: &CartKey, quantity: u32) -> MutationOutcome {
        let Some(_guard) = self.begin_mutation() else {
            return self.busy();
        };
        settle(self.try_change_quantity(key, quantity).await)
    }

    async fn try_change_quantity(&self, key: &CartKey, quantity: u32) -> Result<(), MutationOutcome> {
        let result = self.collaborators.api.update_quantity(key, quantity).await;
        self.check(result, &QUANTITY_TEXT)?;
        tracing::info!(%key, quantity, "cart quantity changed");

        self.resync().await?;
        self.collaborators.badge.refresh().await;
        Ok(())
    }

    pub async fn remove_item(&self, key: &CartKey) -> MutationOutcome {
        let Some(_guard) = self.begin_mutation() else {
            return self.busy();
        };
        settle(self.try_remove_item(key).await)
    }

    async fn try_remove_item(&self, key: &CartKey) -> Result<(), MutationOutcome> {
        let result = self.collaborators.api.remove_item(key).await;
        self.check(result, &REMOVE_TEXT)?;
        tracing::info!(%key, "cart item removed");

        self.resync().await?;
        self.state.send_modify(|state| {
            state.selection.remove(key);
        });
        self.collaborators.badge.refresh().await;
        Ok(())
    }

    /// Confirm, then remove every selected key one at a time.
    pub async fn remove_selected(&self) -> BulkRemoveOutcome {
        if self.is_mutating() {
            self.collaborators.prompter.notify(BUSY_MESSAGE);
            return BulkRemoveOutcome::Busy;
        }
        let keys = self.state.borrow().selection.keys();
        if keys.is_empty() {
            self.collaborators.prompter.notify(NOTHING_TO_REMOVE_MESSAGE);
            return BulkRemoveOutcome::NothingSelected;
        }

        let question = format!("Remove {} selected items?", keys.len());
        if !self.collaborators.prompter.confirm(&question).await {
            tracing::debug!(count = keys.len(), "bulk remove declined");
            return BulkRemoveOutcome::Declined;
        }

        let Some(_guard) = self.begin_mutation() else {
            self.collaborators.prompter.notify(BUSY_MESSAGE);
            return BulkRemoveOutcome::Busy;
        };

        let mut report = remove_sequentially(self.collaborators.api.as_ref(), &keys).await;
        if report.aborted_by_auth() {
            return BulkRemoveOutcome::Completed(report);
        }
        tracing::info!(
            removed = report.removed_count(),
            failed = report.failed_count(),
            "bulk remove finished"
        );

        if self.resync().await.is_err() {
            report.mark_unauthenticated();
            return BulkRemoveOutcome::Completed(report);
        }
        self.state.send_modify(|state| state.selection.clear());
        self.collaborators.badge.refresh().await;
        self.collaborators.prompter.notify(&report.message());
        BulkRemoveOutcome::Completed(report)
    }

    /// Local only. Absent and unavailable lines cannot be selected.
    ///
    /// Returns whether the selection changed.
    pub fn toggle_item(&self, key: &CartKey, selected: bool) -> bool {
        self.state.send_if_modified(|state| {
            if selected {
                let eligible = state.line(key).is_some_and(|line| line.available);
                eligible && state.selection.insert(key.clone())
            } else {
                state.selection.remove(key)
            }
        })
    }

    /// Local only. Selecting picks every available line; deselecting clears.
    pub fn toggle_all(&self, selected: bool) -> bool {
        self.state.send_if_modified(|state| {
            let next = if selected {
                SelectionSet::all_available(&state.lines)
            } else {
                SelectionSet::new()
            };
            if next == state.selection {
                return false;
            }
            state.selection = next;
            true
        })
    }

    /// Hand the selected lines to the order flow and navigate there.
    pub fn proceed_to_checkout(&self) -> Result<CheckoutOutcome, SessionError> {
        if self.is_mutating() {
            self.collaborators.prompter.notify(BUSY_MESSAGE);
            return Ok(CheckoutOutcome::Busy);
        }
        let selected = self.state.borrow().selected_lines();
        if selected.is_empty() {
            self.collaborators.prompter.notify(NOTHING_TO_ORDER_MESSAGE);
            return Ok(CheckoutOutcome::NothingSelected);
        }

        if let Err(err) = write_selected_items(self.collaborators.session.as_ref(), &selected) {
            tracing::error!(error = %err, "checkout handoff failed");
            self.collaborators.prompter.notify(CHECKOUT_FAILED_MESSAGE);
            return Err(err);
        }
        tracing::info!(count = selected.len(), "selected items handed off to checkout");
        self.collaborators.navigator.navigate(Route::Order);
        Ok(CheckoutOutcome::HandedOff(selected))
    }

    /// Product-detail flow: login probe, duplicate check, add, refetch.
    pub async fn add_item(&self, key: &CartKey, quantity: u32) -> MutationOutcome {
        if quantity == 0 {
            return self.reject_locally("Quantity must be at least 1.");
        }
        let Some(_guard) = self.begin_mutation() else {
            return self.busy();
        };
        settle(self.try_add_item(key, quantity).await)
    }

    async fn try_add_item(&self, key: &CartKey, quantity: u32) -> Result<(), MutationOutcome> {
        let api = &self.collaborators.api;
        self.check(api.item_count().await, &ADD_TEXT)?;

        let current = self.check(api.fetch_cart().await, &ADD_TEXT)?;
        if current.contains(key) {
            return Err(self.reject_locally("This product is already in your cart."));
        }

        self.check(api.add_item(key, quantity).await, &ADD_TEXT)?;
        tracing::info!(%key, quantity, "cart item added");

        self.resync().await?;
        self.collaborators.prompter.notify("Added to cart.");
        self.collaborators.badge.refresh().await;
        Ok(())
    }

    /// Confirm, then empty the cart on the server.
    pub async fn clear_cart(&self) -> MutationOutcome {
        if self.is_mutating() {
            return self.busy();
        }
        if !self
            .collaborators
            .prompter
            .confirm("Remove every item from the cart?")
            .await
        {
            return MutationOutcome::Declined;
        }
        let Some(_guard) = self.begin_mutation() else {
            return self.busy();
        };
        settle(self.try_clear_cart().await)
    }

    async fn try_clear_cart(&self) -> Result<(), MutationOutcome> {
        self.check(self.collaborators.api.clear_cart().await, &CLEAR_TEXT)?;
        tracing::info!("cart cleared");

        self.resync().await?;
        self.collaborators.badge.refresh().await;
        Ok(())
    }

    fn begin_mutation(&self) -> Option<MutatingGuard<'_>> {
        let started = self.state.send_if_modified(|state| {
            if state.is_mutating {
                return false;
            }
            state.is_mutating = true;
            state.phase = CartPhase::Mutating;
            true
        });
        if started {
            Some(MutatingGuard { state: &self.state })
        } else {
            None
        }
    }

    fn busy(&self) -> MutationOutcome {
        self.collaborators.prompter.notify(BUSY_MESSAGE);
        MutationOutcome::Busy
    }

    fn reject_locally(&self, message: &str) -> MutationOutcome {
        self.collaborators.prompter.notify(message);
        MutationOutcome::Rejected(ApiFailure::validation(message))
    }

    /// Unwraps a successful response; anything else becomes the outcome,
    /// after notifying the user where appropriate.
    fn check<T>(
        &self,
        result: ApiResult<Decoded<T>>,
        text: &FailureText,
    ) -> Result<T, MutationOutcome> {
        match result {
            Ok(Decoded::Ok(value)) => Ok(value),
            Ok(Decoded::Unauthenticated) => Err(MutationOutcome::Unauthenticated),
            Ok(Decoded::Err(failure)) => {
                tracing::warn!(category = %failure.category, error = %failure, "cart mutation rejected");
                let message = if failure.message.trim().is_empty() {
                    text.rejected
                } else {
                    failure.message.as_str()
                };
                self.collaborators.prompter.notify(message);
                Err(MutationOutcome::Rejected(failure))
            }
            Err(err) => {
                tracing::error!(error = %err, "cart request failed");
                self.collaborators.prompter.notify(text.network);
                Err(MutationOutcome::Rejected(err.into_failure()))
            }
        }
    }

    /// Replace lines with the server's current cart.
    ///
    /// Inside a mutation the phase stays `Mutating` until the guard drops.
    async fn refetch(&self) -> LoadOutcome {
        match self.collaborators.api.fetch_cart().await {
            Ok(Decoded::Ok(snapshot)) => {
                tracing::debug!(lines = snapshot.cart_items.len(), "cart fetched");
                self.state.send_modify(|state| {
                    state.apply_snapshot(snapshot);
                    if state.phase != CartPhase::Mutating {
                        state.phase = CartPhase::Ready;
                    }
                });
                LoadOutcome::Loaded
            }
            Ok(Decoded::Unauthenticated) => LoadOutcome::Unauthenticated,
            Ok(Decoded::Err(failure)) => {
                tracing::warn!(category = %failure.category, error = %failure, "cart load failed");
                self.fail_load(&failure);
                LoadOutcome::Failed(failure)
            }
            Err(err) => {
                tracing::error!(error = %err, "cart load request failed");
                let failure = err.into_failure();
                self.fail_load(&failure);
                LoadOutcome::Failed(failure)
            }
        }
    }

    /// Refetch after a successful mutation. A 401 ends the operation; a
    /// failed refetch leaves the phase `Failed` and the mutation applied.
    async fn resync(&self) -> Result<(), MutationOutcome> {
        match self.refetch().await {
            LoadOutcome::Unauthenticated => {
                tracing::info!("cart refetch requires login, skipping follow-up updates");
                Err(MutationOutcome::Unauthenticated)
            }
            LoadOutcome::Loaded | LoadOutcome::Failed(_) | LoadOutcome::Busy => Ok(()),
        }
    }

    fn fail_load(&self, failure: &ApiFailure) {
        self.state.send_modify(|state| {
            state.phase = CartPhase::Failed;
            state.load_error = Some(failure.message.clone());
        });
    }
}
