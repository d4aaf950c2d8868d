//! Response envelopes for every backend endpoint this client consumes,
//! parsed and validated at the boundary instead of trusted shape-implicitly.

use serde::Deserialize;

use crate::models::colony::{CollectionPoint, ColonyCandidate};
use crate::models::de;
use crate::models::location::{GeoPoint, SavedLocation};
use crate::models::route::{RouteSuggestion, TimeSlot};

#[derive(Debug, Deserialize)]
pub struct SavedLocationDto {
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl SavedLocationDto {
    /// A stored record counts as a location only when both coordinates are
    /// present and parseable.
    pub fn into_saved(self) -> Option<SavedLocation> {
        let (Some(lat), Some(lng)) = (self.latitude, self.longitude) else {
            return None;
        };
        Some(SavedLocation {
            point: GeoPoint { lat, lng },
            address: self.address,
            city: self.city,
            state: self.state,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CollectorLocationResponse {
    #[serde(default)]
    pub location: Option<SavedLocationDto>,
}

#[derive(Debug, Deserialize)]
pub struct ColoniesResponse {
    #[serde(default)]
    pub colonies: Vec<ColonyCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionPointsResponse {
    #[serde(default)]
    pub collection_points: Vec<CollectionPoint>,
}

#[derive(Debug, Deserialize)]
pub struct RouteSuggestionsResponse {
    #[serde(default)]
    pub routes: Vec<RouteSuggestion>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSlotsResponse {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// The backend is inconsistent about which key carries its error text.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self, status: u16) -> String {
        self.error
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_location_requires_both_coordinates() {
        let dto: SavedLocationDto =
            serde_json::from_str(r#"{"latitude": "17.38", "longitude": null, "city": "Hyderabad"}"#)
                .unwrap();
        assert!(dto.into_saved().is_none());

        let dto: SavedLocationDto =
            serde_json::from_str(r#"{"latitude": "17.38", "longitude": 78.48, "city": "Hyderabad"}"#)
                .unwrap();
        let saved = dto.into_saved().unwrap();
        assert_eq!(saved.point.lat, 17.38);
        assert_eq!(saved.city.as_deref(), Some("Hyderabad"));
    }

    #[test]
    fn error_body_prefers_error_key() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "slot full", "msg": "other"}"#).unwrap();
        assert_eq!(body.into_message(409), "slot full");

        let body: ErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(body.into_message(500), "request failed with status 500");
    }

    #[test]
    fn null_location_envelope_parses() {
        let response: CollectorLocationResponse =
            serde_json::from_str(r#"{"location": null}"#).unwrap();
        assert!(response.location.is_none());
    }
}
