//! View state and values derived from it.

use mosi_api_client::{CartKey, CartLine, CartSnapshot};

use crate::selection::SelectionSet;

/// Controller lifecycle.
///
/// `Loading → Ready`, `Ready → Mutating → Ready`, `Ready → Failed`,
/// `Failed → Loading` on retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CartPhase {
    #[default]
    Loading,
    Ready,
    Mutating,
    Failed,
}

impl CartPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Mutating => "mutating",
            Self::Failed => "failed",
        }
    }
}

/// Everything a renderer needs to draw the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartViewState {
    pub phase: CartPhase,
    pub lines: Vec<CartLine>,
    pub selection: SelectionSet,
    /// Mutating controls must be disabled while set.
    pub is_mutating: bool,
    pub load_error: Option<String>,
    /// Server-reported emptiness of the last fetched cart.
    pub empty: bool,
}

impl CartViewState {
    pub fn line(&self, key: &CartKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Lines whose key is selected, in line order.
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter(|line| self.selection.contains(&line.key()))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary::of(self)
    }

    /// Replaces lines with a fresh snapshot and selects every available line.
    pub(crate) fn apply_snapshot(&mut self, snapshot: CartSnapshot) {
        self.empty = snapshot.is_empty();
        self.selection = SelectionSet::all_available(&snapshot.cart_items);
        self.lines = snapshot.cart_items;
        self.load_error = None;
    }
}

/// Derived values; recomputed on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    pub available_count: usize,
    /// Selected keys that name a present line.
    pub selected_count: usize,
    pub is_all_selected: bool,
    pub selected_subtotal: i64,
    pub selected_lines: Vec<CartLine>,
}

impl CartSummary {
    pub fn of(state: &CartViewState) -> Self {
        let available_count = state.lines.iter().filter(|line| line.available).count();
        let selected_lines = state.selected_lines();
        let selected_count = selected_lines.len();
        let all_available_selected = state
            .lines
            .iter()
            .filter(|line| line.available)
            .all(|line| state.selection.contains(&line.key()));

        Self {
            available_count,
            selected_count,
            is_all_selected: available_count > 0
                && all_available_selected
                && state.selection.len() == available_count,
            selected_subtotal: selected_lines
                .iter()
                .map(CartLine::line_total)
                .fold(0, i64::saturating_add),
            selected_lines,
        }
    }
}
