//! Turns server-computed route suggestions into a confirmed batch booking.
//! Selection is local state; the backend owns the suggestions, the slots and
//! the final say on whether a slot is still free.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Days, NaiveDate, Utc};
use tracing::{info, warn};

use crate::api::client::{ApiClient, SuggestionQuery};
use crate::error::AppError;
use crate::models::route::{RouteBatchRequest, RouteSuggestion, ScheduleReceipt, TimeSlot};

const SELECTION_REQUIRED: &str = "Please select a route, date, and time slot";

struct PlannerState {
    suggestions: Vec<RouteSuggestion>,
    selected: Option<RouteSuggestion>,
    booking_date: Option<NaiveDate>,
    time_slot: Option<String>,
    slots: Vec<TimeSlot>,
    query: Option<SuggestionQuery>,
    error: Option<String>,
    message: Option<String>,
    loading: bool,
    scheduling: bool,
}

pub struct RoutePlanner {
    api: Arc<ApiClient>,
    state: Mutex<PlannerState>,
}

impl RoutePlanner {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(PlannerState {
                suggestions: Vec::new(),
                selected: None,
                // Pickups are planned for the next day by default.
                booking_date: Some(tomorrow()),
                time_slot: None,
                slots: Vec::new(),
                query: None,
                error: None,
                message: None,
                loading: false,
                scheduling: false,
            }),
        }
    }

    /// Fetch fresh suggestions and auto-select the first, best-ranked one.
    /// An empty result leaves nothing selected and commit blocked.
    pub async fn load_suggestions(&self, query: &SuggestionQuery) -> Result<(), AppError> {
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
            state.query = Some(*query);
        }

        match self.api.route_suggestions(query).await {
            Ok(routes) => {
                let mut state = self.lock();
                state.selected = routes.first().cloned();
                info!(suggestions = routes.len(), "route suggestions loaded");
                state.suggestions = routes;
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                let mut state = self.lock();
                state.suggestions.clear();
                state.selected = None;
                state.error = Some(format!(
                    "Failed to load route suggestions: {}",
                    err.user_message()
                ));
                state.loading = false;
                Err(err)
            }
        }
    }

    /// Local selection change only; no network call.
    pub fn select_route(&self, route_id: i64) -> Result<(), AppError> {
        let mut state = self.lock();
        let route = state
            .suggestions
            .iter()
            .find(|route| route.route_id == route_id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("unknown route {route_id}")))?;
        state.selected = Some(route);
        Ok(())
    }

    pub async fn set_date(&self, date: NaiveDate) -> Result<(), AppError> {
        self.lock().booking_date = Some(date);
        self.load_time_slots().await
    }

    /// Refresh the slot list for the chosen date. Failures here are logged
    /// and leave the previous list in place; the commit path revalidates.
    pub async fn load_time_slots(&self) -> Result<(), AppError> {
        let Some(date) = self.lock().booking_date else {
            return Ok(());
        };

        match self.api.time_slots(date).await {
            Ok(slots) => {
                self.lock().slots = slots;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, %date, "failed to load time slots");
                Err(err)
            }
        }
    }

    /// Availability on the slot list is advisory; picking a full slot is
    /// allowed here and rejected by the server at commit time.
    pub fn select_time_slot(&self, slot: impl Into<String>) {
        self.lock().time_slot = Some(slot.into());
    }

    pub async fn commit(&self) -> Result<ScheduleReceipt, AppError> {
        let request = {
            let state = self.lock();
            let (Some(route), Some(date), Some(slot)) = (
                state.selected.clone(),
                state.booking_date,
                state.time_slot.clone(),
            ) else {
                drop(state);
                return Err(self.fail_validation(SELECTION_REQUIRED.to_string()));
            };
            RouteBatchRequest {
                pickups: route.pickups,
                booking_date: date,
                time_slot: slot,
            }
        };

        if request.booking_date < Utc::now().date_naive() {
            return Err(self.fail_validation("Booking date cannot be in the past".to_string()));
        }

        {
            let mut state = self.lock();
            state.scheduling = true;
            state.error = None;
            state.message = None;
        }

        match self.api.schedule_route(&request).await {
            Ok(receipt) => {
                info!(
                    bookings = receipt.booking_ids.len(),
                    batch_id = receipt.batch_id.as_deref().unwrap_or(""),
                    "route scheduled"
                );
                let query = {
                    let mut state = self.lock();
                    state.scheduling = false;
                    state.message = Some(format!(
                        "Route scheduled successfully! {} pickups booked.",
                        receipt.booking_ids.len()
                    ));
                    state.query
                };

                // The just-booked colonies are no longer ready, so both the
                // suggestions and the slot load are stale now.
                if let Some(query) = query {
                    let _ = self.load_suggestions(&query).await;
                }
                let _ = self.load_time_slots().await;

                let mut state = self.lock();
                state.selected = None;
                state.time_slot = None;
                Ok(receipt)
            }
            Err(err) => {
                let mut state = self.lock();
                state.scheduling = false;
                state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub fn suggestions(&self) -> Vec<RouteSuggestion> {
        self.lock().suggestions.clone()
    }

    pub fn selected_route(&self) -> Option<RouteSuggestion> {
        self.lock().selected.clone()
    }

    pub fn booking_date(&self) -> Option<NaiveDate> {
        self.lock().booking_date
    }

    pub fn time_slot(&self) -> Option<String> {
        self.lock().time_slot.clone()
    }

    pub fn time_slots(&self) -> Vec<TimeSlot> {
        self.lock().slots.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn message(&self) -> Option<String> {
        self.lock().message.clone()
    }

    pub fn is_scheduling(&self) -> bool {
        self.lock().scheduling
    }

    fn fail_validation(&self, message: String) -> AppError {
        self.lock().error = Some(message.clone());
        AppError::Validation(message)
    }

    fn lock(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().expect("planner state lock poisoned")
    }
}

pub fn tomorrow() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}
