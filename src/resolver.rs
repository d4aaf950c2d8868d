//! Multi-strategy resolution of the effective location. Strategies are tried
//! in priority order (saved service area, then live position), with explicit
//! overrides for a custom coordinate or no filter at all. Only the latest
//! attempt may publish its result; superseded attempts are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api::client::ApiClient;
use crate::error::AppError;
use crate::models::location::{EffectiveLocation, GeoPoint, LocationMethod, SavedLocation};

/// One-shot position request options, mirroring the platform geolocation
/// contract: bounded wait, tolerance for a recently cached fix.
#[derive(Debug, Clone, Copy)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl Default for PositionRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub point: GeoPoint,
    pub accuracy_m: f64,
}

/// Platform position capability. Implementations should respect the request
/// options; the resolver applies the timeout as a backstop regardless.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self, request: PositionRequest) -> Result<PositionFix, AppError>;
}

/// Fixed coordinate injected from configuration, for headless runs.
pub struct StaticPositionSource {
    fix: Option<PositionFix>,
}

impl StaticPositionSource {
    pub fn new(fix: Option<PositionFix>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl PositionSource for StaticPositionSource {
    async fn current_position(&self, _request: PositionRequest) -> Result<PositionFix, AppError> {
        self.fix
            .ok_or_else(|| AppError::Position("no device position configured".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub effective: EffectiveLocation,
    pub saved: Option<SavedLocation>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Snapshot {
    pub fn has_location(&self) -> bool {
        self.effective.point().is_some()
    }

    pub fn is_using_saved_location(&self) -> bool {
        self.effective.method() == LocationMethod::Saved
    }

    pub fn is_using_current_location(&self) -> bool {
        self.effective.method() == LocationMethod::Current
    }

    pub fn is_showing_all(&self) -> bool {
        self.effective.method() == LocationMethod::All
    }

    pub fn is_using_custom_location(&self) -> bool {
        self.effective.method() == LocationMethod::Custom
    }
}

struct ResolverState {
    effective: EffectiveLocation,
    saved: Option<SavedLocation>,
    loading: bool,
    error: Option<String>,
}

pub struct LocationResolver {
    api: Arc<ApiClient>,
    positions: Arc<dyn PositionSource>,
    request: PositionRequest,
    state: Mutex<ResolverState>,
    attempts: AtomicU64,
}

impl LocationResolver {
    pub fn new(api: Arc<ApiClient>, positions: Arc<dyn PositionSource>) -> Self {
        Self {
            api,
            positions,
            request: PositionRequest::default(),
            state: Mutex::new(ResolverState {
                effective: EffectiveLocation::All,
                saved: None,
                loading: false,
                error: None,
            }),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn with_request(mut self, request: PositionRequest) -> Self {
        self.request = request;
        self
    }

    /// Entry strategy: the stored service-area coordinate, falling through to
    /// the live position when none is on record or the read fails.
    pub async fn load_saved_location(&self) {
        let attempt = self.begin_attempt();
        match self.api.collector_location().await {
            Ok(Some(saved)) => {
                self.apply(attempt, |state| {
                    info!(
                        lat = saved.point.lat,
                        lng = saved.point.lng,
                        city = saved.city.as_deref().unwrap_or(""),
                        "using saved location"
                    );
                    state.saved = Some(saved.clone());
                    state.effective = EffectiveLocation::Saved(saved);
                });
            }
            Ok(None) => {
                debug!("no saved location on record, trying current position");
                if self.is_current(attempt) {
                    self.locate_current().await;
                }
            }
            Err(err) => {
                warn!(error = %err, "saved location lookup failed, trying current position");
                if self.is_current(attempt) {
                    self.locate_current().await;
                }
            }
        }
    }

    /// One-shot platform position with a bounded wait. Failure is not fatal:
    /// the resolver degrades to the unfiltered state and records why.
    pub async fn locate_current(&self) {
        let attempt = self.begin_attempt();
        debug!(
            high_accuracy = self.request.high_accuracy,
            timeout_s = self.request.timeout.as_secs(),
            max_age_s = self.request.max_age.as_secs(),
            "requesting current position"
        );
        let outcome =
            tokio::time::timeout(self.request.timeout, self.positions.current_position(self.request))
                .await;

        match outcome {
            Ok(Ok(fix)) => {
                self.apply(attempt, |state| {
                    info!(
                        lat = fix.point.lat,
                        lng = fix.point.lng,
                        accuracy_m = fix.accuracy_m,
                        "using current position"
                    );
                    state.effective = EffectiveLocation::Current {
                        point: fix.point,
                        accuracy_m: fix.accuracy_m,
                    };
                });
            }
            Ok(Err(err)) => {
                let reason = match err {
                    AppError::Position(reason) => reason,
                    other => other.to_string(),
                };
                self.apply(attempt, |state| {
                    warn!(reason = %reason, "position lookup failed, showing everything");
                    state.effective = EffectiveLocation::All;
                    state.error = Some(format!("Location access denied: {reason}"));
                });
            }
            Err(_) => {
                let timeout = self.request.timeout;
                self.apply(attempt, |state| {
                    warn!(?timeout, "position lookup timed out, showing everything");
                    state.effective = EffectiveLocation::All;
                    state.error = Some(format!(
                        "Location access denied: timed out after {}s",
                        timeout.as_secs()
                    ));
                });
            }
        }
    }

    /// Explicit override for a collector-chosen service point. Invalidates
    /// any in-flight attempt.
    pub fn set_custom_location(&self, point: GeoPoint, name: impl Into<String>) {
        self.invalidate_pending();
        let mut state = self.lock();
        state.effective = EffectiveLocation::Custom {
            point,
            name: name.into(),
        };
        state.error = None;
        state.loading = false;
    }

    /// Explicit no-filter state. Invalidates any in-flight attempt.
    pub fn show_all(&self) {
        self.invalidate_pending();
        let mut state = self.lock();
        state.effective = EffectiveLocation::All;
        state.error = None;
        state.loading = false;
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            effective: state.effective.clone(),
            saved: state.saved.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn effective(&self) -> EffectiveLocation {
        self.lock().effective.clone()
    }

    fn begin_attempt(&self) -> u64 {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
        attempt
    }

    fn invalidate_pending(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.attempts.load(Ordering::SeqCst) == attempt
    }

    /// Publish a result only if no newer attempt or override has started.
    fn apply(&self, attempt: u64, publish: impl FnOnce(&mut ResolverState)) {
        if !self.is_current(attempt) {
            debug!(attempt, "dropping superseded resolution result");
            return;
        }
        let mut state = self.lock();
        state.error = None;
        publish(&mut state);
        state.loading = false;
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().expect("resolver state lock poisoned")
    }
}
