//! Geofiltered list feeds. Each feed re-queries the backend whenever the
//! effective location or filters change; the newest refresh wins and the held
//! list is replaced whole, never merged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::api::client::{ApiClient, CollectionPointQuery, GeoFilter};
use crate::error::AppError;
use crate::geo;
use crate::models::colony::{CollectionPoint, ColonyCandidate, WasteType};
use crate::models::location::EffectiveLocation;

/// Which side of the app is asking; decides the endpoint and default radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Collector,
    Citizen,
}

impl Role {
    pub fn default_radius_km(self) -> f64 {
        match self {
            Role::Collector => 500.0,
            Role::Citizen => 25.0,
        }
    }
}

/// Collection points are browsed at neighbourhood scale for both roles.
pub const COLLECTION_POINT_RADIUS_KM: f64 = 25.0;

struct FeedState<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    loaded_once: bool,
}

impl<T> FeedState<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            loaded_once: false,
        }
    }
}

pub struct ColonyFeed {
    api: Arc<ApiClient>,
    role: Role,
    radius_km: f64,
    state: Mutex<FeedState<ColonyCandidate>>,
    refreshes: AtomicU64,
}

impl ColonyFeed {
    pub fn new(api: Arc<ApiClient>, role: Role) -> Self {
        Self {
            api,
            role,
            radius_km: role.default_radius_km(),
            state: Mutex::new(FeedState::new()),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Re-query for the given effective location. Call again on every
    /// location change; a slower earlier request cannot overwrite the result
    /// of a later one.
    pub async fn refresh(&self, location: &EffectiveLocation) -> Result<(), AppError> {
        let refresh = self.begin();

        let result = match (self.role, location.point()) {
            (Role::Collector, Some(point)) => {
                self.api
                    .ready_colonies(Some(&GeoFilter {
                        point,
                        radius_km: self.radius_km,
                    }))
                    .await
            }
            (Role::Collector, None) => self.api.ready_colonies(None).await,
            (Role::Citizen, Some(point)) => {
                self.api
                    .nearby_colonies(&GeoFilter {
                        point,
                        radius_km: self.radius_km,
                    })
                    .await
            }
            // Citizens have no "show everything" view; without a coordinate
            // the list is simply empty.
            (Role::Citizen, None) => Ok(Vec::new()),
        };

        match result {
            Ok(mut colonies) => {
                if let Some(origin) = location.point() {
                    geo::annotate_and_sort(&mut colonies, origin);
                }
                self.apply(refresh, |state| {
                    debug!(count = colonies.len(), "colony list replaced");
                    state.items = colonies;
                    state.loaded_once = true;
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "colony refresh failed");
                let message = err.user_message();
                self.apply(refresh, |state| {
                    if !state.loaded_once {
                        state.items.clear();
                    }
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    pub fn colonies(&self) -> Vec<ColonyCandidate> {
        self.lock().items.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn begin(&self) -> u64 {
        let refresh = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
        refresh
    }

    fn apply(&self, refresh: u64, publish: impl FnOnce(&mut FeedState<ColonyCandidate>)) {
        if self.refreshes.load(Ordering::SeqCst) != refresh {
            debug!(refresh, "dropping superseded colony refresh");
            return;
        }
        let mut state = self.lock();
        state.error = None;
        publish(&mut state);
        state.loading = false;
    }

    fn lock(&self) -> MutexGuard<'_, FeedState<ColonyCandidate>> {
        self.state.lock().expect("colony feed lock poisoned")
    }
}

pub struct CollectionPointFeed {
    api: Arc<ApiClient>,
    radius_km: f64,
    state: Mutex<FeedState<CollectionPoint>>,
    refreshes: AtomicU64,
}

impl CollectionPointFeed {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            radius_km: COLLECTION_POINT_RADIUS_KM,
            state: Mutex::new(FeedState::new()),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Re-query for the given location and waste-type filters. Same
    /// supersession contract as the colony feed.
    pub async fn refresh(
        &self,
        location: &EffectiveLocation,
        waste_types: &[WasteType],
    ) -> Result<(), AppError> {
        let refresh = self.begin();

        let query = CollectionPointQuery {
            filter: location.point().map(|point| GeoFilter {
                point,
                radius_km: self.radius_km,
            }),
            waste_types: waste_types.to_vec(),
        };

        match self.api.collection_points(&query).await {
            Ok(points) => {
                self.apply(refresh, |state| {
                    debug!(count = points.len(), "collection point list replaced");
                    state.items = points;
                    state.loaded_once = true;
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "collection point refresh failed");
                let message = err.user_message();
                self.apply(refresh, |state| {
                    if !state.loaded_once {
                        state.items.clear();
                    }
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    pub fn points(&self) -> Vec<CollectionPoint> {
        self.lock().items.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn begin(&self) -> u64 {
        let refresh = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
        refresh
    }

    fn apply(&self, refresh: u64, publish: impl FnOnce(&mut FeedState<CollectionPoint>)) {
        if self.refreshes.load(Ordering::SeqCst) != refresh {
            debug!(refresh, "dropping superseded collection point refresh");
            return;
        }
        let mut state = self.lock();
        state.error = None;
        publish(&mut state);
        state.loading = false;
    }

    fn lock(&self) -> MutexGuard<'_, FeedState<CollectionPoint>> {
        self.state.lock().expect("collection point feed lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn collector_default_radius_is_500_km() {
        assert_eq!(Role::Collector.default_radius_km(), 500.0);
    }

    #[test]
    fn citizen_default_radius_is_25_km() {
        assert_eq!(Role::Citizen.default_radius_km(), 25.0);
    }
}
