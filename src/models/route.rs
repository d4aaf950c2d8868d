use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::colony::WasteType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupStop {
    pub colony_id: i64,
    pub colony_name: String,
    pub order_in_route: u32,
    #[serde(default)]
    pub distance_from_previous: f64,
    #[serde(default)]
    pub ready_waste_type: Option<WasteType>,
    #[serde(default)]
    pub max_waste_kg: f64,
}

/// A server-computed ordered set of colony pickups for one collector trip.
/// Immutable once received; which one is selected is local state only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSuggestion {
    pub route_id: i64,
    pub pickups: Vec<PickupStop>,
    pub total_distance: f64,
    pub estimated_time_hours: f64,
    #[serde(default)]
    pub total_colonies: u32,
    #[serde(default)]
    pub total_estimated_weight: f64,
    pub efficiency_score: f64,
}

impl RouteSuggestion {
    /// Stops must be numbered 1..=N in list order.
    pub fn has_contiguous_order(&self) -> bool {
        self.pickups
            .iter()
            .enumerate()
            .all(|(idx, stop)| stop.order_in_route as usize == idx + 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub slot: String,
    #[serde(default)]
    pub time: Option<String>,
    pub label: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub current_bookings: Option<u32>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteBatchRequest {
    pub pickups: Vec<PickupStop>,
    pub booking_date: NaiveDate,
    pub time_slot: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleReceipt {
    #[serde(default)]
    pub message: Option<String>,
    pub booking_ids: Vec<i64>,
    #[serde(default)]
    pub batch_id: Option<String>,
}
