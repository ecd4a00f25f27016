//! # Mock Capabilities
//!
//! Scripted stand-ins for the external capabilities: the mobile bridge, the
//! browser position API and the routing service.
//!
//! Every mock is cheap to clone and all clones share state, so a test keeps
//! one copy for scripting and assertions and hands another to the code
//! under test.
//!
//! ```ignore
//! let bridge = MockBridge::new();
//! bridge.expect_position().return_err("location unavailable");
//! bridge.expect_position().return_ok(51.5, -0.1);
//!
//! let handle = geolocation::spawn_on(&Platform::native(Arc::new(bridge.clone())), options);
//! // drive the handle...
//! bridge.verify(); // every scripted position was consumed
//! ```

use crate::geolocation::{
    BridgeCallback, BridgeError, BridgePosition, BrowserGeolocation, BrowserPosition,
    BrowserPositionError, ErrorCallback, MobileBridge, PermissionState, PositionOptions,
    SuccessCallback, WatchErrorCallback, WatchSuccessCallback,
};
use crate::routing::{RouteRequest, RouteResponse, RouteService, RoutingError};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

type Queue<T> = Arc<Mutex<VecDeque<T>>>;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// MOBILE BRIDGE
// =============================================================================

#[derive(Default)]
struct BridgeState {
    permission: Option<PermissionState>,
    after_prompt: Option<PermissionState>,
    permission_requests: usize,
    position_requests: Vec<PositionOptions>,
    next_watch: u64,
    watches: BTreeMap<String, BridgeCallback>,
    cleared: Vec<String>,
    cleared_callbacks: Vec<BridgeCallback>,
}

/// A [`MobileBridge`] with scripted positions and recorded calls.
///
/// Permission is granted unless [`MockBridge::with_permission`] says otherwise.
/// A position request with nothing scripted fails with a position-unavailable
/// message.
#[derive(Clone, Default)]
pub struct MockBridge {
    state: Arc<Mutex<BridgeState>>,
    positions: Queue<Result<BridgePosition, BridgeError>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported permission state and the answer to a prompt.
    pub fn with_permission(self, current: PermissionState, after_prompt: PermissionState) -> Self {
        {
            let mut state = lock(&self.state);
            state.permission = Some(current);
            state.after_prompt = Some(after_prompt);
        }
        self
    }

    /// Expects a `get_current_position` call.
    pub fn expect_position(&self) -> BridgePositionBuilder {
        BridgePositionBuilder {
            positions: self.positions.clone(),
        }
    }

    /// Delivers an update to every active watch.
    pub fn emit(&self, update: Result<BridgePosition, BridgeError>) {
        let callbacks: Vec<_> = lock(&self.state).watches.values().cloned().collect();
        for callback in callbacks {
            callback(update.clone());
        }
    }

    /// Delivers an update to watches that were already cleared, like a
    /// callback that was in flight when the watch was removed.
    pub fn emit_late(&self, update: Result<BridgePosition, BridgeError>) {
        let callbacks = lock(&self.state).cleared_callbacks.clone();
        for callback in callbacks {
            callback(update.clone());
        }
    }

    pub fn permission_requests(&self) -> usize {
        lock(&self.state).permission_requests
    }

    pub fn position_requests(&self) -> usize {
        lock(&self.state).position_requests.len()
    }

    /// Options of every position request, in order.
    pub fn requested_options(&self) -> Vec<PositionOptions> {
        lock(&self.state).position_requests.clone()
    }

    pub fn active_watches(&self) -> usize {
        lock(&self.state).watches.len()
    }

    pub fn clear_watch_calls(&self) -> Vec<String> {
        lock(&self.state).cleared.clone()
    }

    /// Panics if scripted positions were never requested.
    pub fn verify(&self) {
        let remaining = lock(&self.positions).len();
        assert!(remaining == 0, "{remaining} scripted bridge positions were never requested");
    }
}

#[async_trait]
impl MobileBridge for MockBridge {
    async fn check_permissions(&self) -> Result<PermissionState, BridgeError> {
        Ok(lock(&self.state).permission.unwrap_or(PermissionState::Granted))
    }

    async fn request_permissions(&self) -> Result<PermissionState, BridgeError> {
        let mut state = lock(&self.state);
        state.permission_requests += 1;
        let answer = state.after_prompt.unwrap_or(PermissionState::Granted);
        state.permission = Some(answer);
        Ok(answer)
    }

    async fn get_current_position(
        &self,
        opts: PositionOptions,
    ) -> Result<BridgePosition, BridgeError> {
        lock(&self.state).position_requests.push(opts);
        lock(&self.positions)
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::new("location unavailable")))
    }

    async fn watch_position(
        &self,
        _opts: PositionOptions,
        callback: BridgeCallback,
    ) -> Result<String, BridgeError> {
        let mut state = lock(&self.state);
        state.next_watch += 1;
        let handle = format!("watch-{}", state.next_watch);
        state.watches.insert(handle.clone(), callback);
        Ok(handle)
    }

    async fn clear_watch(&self, handle: &str) -> Result<(), BridgeError> {
        let mut state = lock(&self.state);
        state.cleared.push(handle.to_string());
        match state.watches.remove(handle) {
            Some(callback) => {
                state.cleared_callbacks.push(callback);
                Ok(())
            }
            None => Err(BridgeError::new(format!("unknown watch {handle}"))),
        }
    }
}

/// Builder for bridge position expectations.
pub struct BridgePositionBuilder {
    positions: Queue<Result<BridgePosition, BridgeError>>,
}

impl BridgePositionBuilder {
    pub fn return_ok(self, latitude: f64, longitude: f64) {
        lock(&self.positions).push_back(Ok(BridgePosition::new(latitude, longitude)));
    }

    /// The bridge only reports text; see [`BridgeError`].
    pub fn return_err(self, message: &str) {
        lock(&self.positions).push_back(Err(BridgeError::new(message)));
    }
}

// =============================================================================
// BROWSER POSITION API
// =============================================================================

#[derive(Default)]
struct BrowserState {
    position_requests: Vec<PositionOptions>,
    next_watch: i64,
    watches: BTreeMap<i64, (WatchSuccessCallback, WatchErrorCallback)>,
    cleared: Vec<i64>,
}

/// A [`BrowserGeolocation`] that answers one-shot requests synchronously from
/// a script. Unscripted requests fail with code 2.
#[derive(Clone, Default)]
pub struct MockBrowser {
    state: Arc<Mutex<BrowserState>>,
    positions: Queue<Result<BrowserPosition, BrowserPositionError>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `get_current_position` call.
    pub fn expect_position(&self) -> BrowserPositionBuilder {
        BrowserPositionBuilder {
            positions: self.positions.clone(),
        }
    }

    /// Delivers an update to every active watch.
    pub fn emit(&self, update: Result<BrowserPosition, BrowserPositionError>) {
        let callbacks: Vec<_> = lock(&self.state).watches.values().cloned().collect();
        for (on_success, on_error) in callbacks {
            match update.clone() {
                Ok(position) => on_success(position),
                Err(error) => on_error(error),
            }
        }
    }

    pub fn position_requests(&self) -> usize {
        lock(&self.state).position_requests.len()
    }

    pub fn requested_options(&self) -> Vec<PositionOptions> {
        lock(&self.state).position_requests.clone()
    }

    pub fn active_watches(&self) -> usize {
        lock(&self.state).watches.len()
    }

    pub fn clear_watch_calls(&self) -> Vec<i64> {
        lock(&self.state).cleared.clone()
    }

    /// Panics if scripted positions were never requested.
    pub fn verify(&self) {
        let remaining = lock(&self.positions).len();
        assert!(remaining == 0, "{remaining} scripted browser positions were never requested");
    }
}

impl BrowserGeolocation for MockBrowser {
    fn get_current_position(
        &self,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
        opts: PositionOptions,
    ) {
        lock(&self.state).position_requests.push(opts);
        let next = lock(&self.positions).pop_front();
        match next {
            Some(Ok(position)) => on_success(position),
            Some(Err(error)) => on_error(error),
            None => on_error(BrowserPositionError::new(
                BrowserPositionError::POSITION_UNAVAILABLE,
                "Position unavailable",
            )),
        }
    }

    fn watch_position(
        &self,
        on_success: WatchSuccessCallback,
        on_error: WatchErrorCallback,
        _opts: PositionOptions,
    ) -> i64 {
        let mut state = lock(&self.state);
        state.next_watch += 1;
        let id = state.next_watch;
        state.watches.insert(id, (on_success, on_error));
        id
    }

    fn clear_watch(&self, id: i64) {
        let mut state = lock(&self.state);
        state.cleared.push(id);
        state.watches.remove(&id);
    }
}

/// Builder for browser position expectations.
pub struct BrowserPositionBuilder {
    positions: Queue<Result<BrowserPosition, BrowserPositionError>>,
}

impl BrowserPositionBuilder {
    pub fn return_ok(self, latitude: f64, longitude: f64) {
        lock(&self.positions).push_back(Ok(BrowserPosition {
            latitude,
            longitude,
            heading: None,
            speed: None,
        }));
    }

    pub fn return_err(self, code: u16, message: &str) {
        lock(&self.positions).push_back(Err(BrowserPositionError::new(code, message)));
    }
}

// =============================================================================
// ROUTING SERVICE
// =============================================================================

/// A [`RouteService`] that replays scripted replies and records requests.
///
/// Once the script runs out it answers with the fallback reply, if one was
/// set, and with a transport error otherwise.
#[derive(Clone, Default)]
pub struct MockRouter {
    responses: Queue<Result<RouteResponse, RoutingError>>,
    fallback: Arc<Mutex<Option<RouteResponse>>>,
    requests: Arc<Mutex<Vec<RouteRequest>>>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used for every request beyond the script.
    pub fn with_fallback(self, response: RouteResponse) -> Self {
        *lock(&self.fallback) = Some(response);
        self
    }

    /// Expects a `route` call.
    pub fn expect_route(&self) -> RouteExpectationBuilder {
        RouteExpectationBuilder {
            responses: self.responses.clone(),
        }
    }

    pub fn route_calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        lock(&self.requests).clone()
    }

    /// Panics if scripted replies were never requested.
    pub fn verify(&self) {
        let remaining = lock(&self.responses).len();
        assert!(remaining == 0, "{remaining} scripted route replies were never requested");
    }
}

#[async_trait]
impl RouteService for MockRouter {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RoutingError> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.responses).pop_front();
        match next {
            Some(response) => response,
            None => lock(&self.fallback)
                .clone()
                .ok_or_else(|| RoutingError::Transport("unexpected route request".into())),
        }
    }
}

/// Builder for `route` expectations.
pub struct RouteExpectationBuilder {
    responses: Queue<Result<RouteResponse, RoutingError>>,
}

impl RouteExpectationBuilder {
    /// Sets the expectation to return a reply.
    pub fn return_ok(self, response: RouteResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RoutingError) {
        lock(&self.responses).push_back(Err(error));
    }
}
