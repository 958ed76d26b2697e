//! In-memory backend and recording collaborators for controller tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mosi_api_client::{
    ApiFailure, ApiResult, CartApi, CartCount, CartKey, CartLine, CartSnapshot, Decoded,
    Navigator, ResponseCode, Route,
};
use mosi_cart::{
    BadgeRefresher, CartCollaborators, CartController, MemorySessionStore, Prompter,
};
use tokio::sync::Notify;

pub fn line(id: i64, option: &str, price: i64, quantity: u32, available: bool) -> CartLine {
    CartLine {
        product_id: id,
        option_type: option.to_string(),
        product_name: format!("product {id}"),
        unit_price: price,
        quantity,
        available,
    }
}

/// The two-line cart used throughout: P1-A available, P2-B paused.
pub fn scenario_lines() -> Vec<CartLine> {
    vec![line(1, "A", 1000, 2, true), line(2, "B", 500, 1, false)]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch,
    Quantity(CartKey, u32),
    Remove(CartKey),
    Add(CartKey, u32),
    Count,
    Clear,
}

/// Server-side cart kept in memory.
#[derive(Default)]
pub struct FakeCart {
    lines: Mutex<Vec<CartLine>>,
    calls: Mutex<Vec<Call>>,
    rejected_removals: Mutex<HashSet<CartKey>>,
    unauthenticated_removals: Mutex<HashSet<CartKey>>,
    fetch_failure: Mutex<Option<ApiFailure>>,
    fetch_unauthenticated: AtomicBool,
    quantity_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeCart {
    pub fn with_lines(lines: Vec<CartLine>) -> Arc<Self> {
        let fake = Self::default();
        *fake.lines.lock().unwrap() = lines;
        Arc::new(fake)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn removal_calls(&self) -> Vec<CartKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Remove(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn reject_removal_of(&self, key: CartKey) {
        self.rejected_removals.lock().unwrap().insert(key);
    }

    pub fn expire_session_on_removal_of(&self, key: CartKey) {
        self.unauthenticated_removals.lock().unwrap().insert(key);
    }

    pub fn fail_fetch_with(&self, failure: Option<ApiFailure>) {
        *self.fetch_failure.lock().unwrap() = failure;
    }

    /// Subsequent `GET /cart` calls answer 401.
    pub fn expire_session_on_fetch(&self) {
        self.fetch_unauthenticated.store(true, Ordering::SeqCst);
    }

    /// Quantity updates wait on the returned gate until notified.
    pub fn gate_quantity_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.quantity_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CartApi for FakeCart {
    async fn fetch_cart(&self) -> ApiResult<Decoded<CartSnapshot>> {
        self.record(Call::Fetch);
        if self.fetch_unauthenticated.load(Ordering::SeqCst) {
            return Ok(Decoded::Unauthenticated);
        }
        if let Some(failure) = self.fetch_failure.lock().unwrap().clone() {
            return Ok(Decoded::Err(failure));
        }
        Ok(Decoded::Ok(CartSnapshot::from_lines(self.lines())))
    }

    async fn update_quantity(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>> {
        self.record(Call::Quantity(key.clone(), quantity));
        let gate = self.quantity_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut lines = self.lines.lock().unwrap();
        if quantity == 0 {
            lines.retain(|line| !line.matches(key));
        } else if let Some(line) = lines.iter_mut().find(|line| line.matches(key)) {
            line.quantity = quantity;
        } else {
            return Ok(Decoded::Err(ApiFailure::protocol(
                ResponseCode::EntityNotFound,
                "Entity not found",
            )));
        }
        Ok(Decoded::Ok(()))
    }

    async fn remove_item(&self, key: &CartKey) -> ApiResult<Decoded<()>> {
        self.record(Call::Remove(key.clone()));
        if self.unauthenticated_removals.lock().unwrap().contains(key) {
            return Ok(Decoded::Unauthenticated);
        }
        if self.rejected_removals.lock().unwrap().contains(key) {
            return Ok(Decoded::Err(ApiFailure::protocol(
                ResponseCode::BusinessError,
                "item is part of a pending order",
            )));
        }
        self.lines.lock().unwrap().retain(|line| !line.matches(key));
        Ok(Decoded::Ok(()))
    }

    async fn add_item(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>> {
        self.record(Call::Add(key.clone(), quantity));
        self.lines.lock().unwrap().push(line(
            key.product_id,
            &key.option_type,
            100,
            quantity,
            true,
        ));
        Ok(Decoded::Ok(()))
    }

    async fn item_count(&self) -> ApiResult<Decoded<CartCount>> {
        self.record(Call::Count);
        let count = self.lines.lock().unwrap().len() as u64;
        Ok(Decoded::Ok(CartCount { count }))
    }

    async fn clear_cart(&self) -> ApiResult<Decoded<()>> {
        self.record(Call::Clear);
        self.lines.lock().unwrap().clear();
        Ok(Decoded::Ok(()))
    }
}

pub struct RecordingPrompter {
    answer: bool,
    notices: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            notices: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        })
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for RecordingPrompter {
    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct CountingBadge {
    refreshes: AtomicUsize,
}

impl CountingBadge {
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BadgeRefresher for CountingBadge {
    async fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub controller: Arc<CartController>,
    pub api: Arc<FakeCart>,
    pub prompter: Arc<RecordingPrompter>,
    pub badge: Arc<CountingBadge>,
    pub session: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(lines: Vec<CartLine>, confirm: bool) -> Self {
        let api = FakeCart::with_lines(lines);
        let prompter = RecordingPrompter::answering(confirm);
        let badge = Arc::new(CountingBadge::default());
        let session = Arc::new(MemorySessionStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let controller = Arc::new(CartController::new(CartCollaborators {
            api: api.clone(),
            badge: badge.clone(),
            prompter: prompter.clone(),
            session: session.clone(),
            navigator: navigator.clone(),
        }));
        Self {
            controller,
            api,
            prompter,
            badge,
            session,
            navigator,
        }
    }

    /// Harness with the cart already loaded and call history cleared.
    pub async fn loaded(lines: Vec<CartLine>, confirm: bool) -> Self {
        let harness = Self::new(lines, confirm);
        harness.controller.load().await;
        harness.api.calls.lock().unwrap().clear();
        harness
    }
}
