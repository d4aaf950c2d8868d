use serde::{Deserialize, Serialize};

use crate::models::de;
use crate::models::location::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    Plastic,
    Paper,
    Metal,
    Glass,
    Textile,
    Organic,
    Mixed,
}

impl WasteType {
    pub fn as_str(self) -> &'static str {
        match self {
            WasteType::Plastic => "plastic",
            WasteType::Paper => "paper",
            WasteType::Metal => "metal",
            WasteType::Glass => "glass",
            WasteType::Textile => "textile",
            WasteType::Organic => "organic",
            WasteType::Mixed => "mixed",
        }
    }
}

/// A colony whose accumulated waste crossed a collection threshold. Owned by
/// the backend; this is a transient, refetchable copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyCandidate {
    pub colony_id: i64,
    pub colony_name: String,
    #[serde(deserialize_with = "de::f64_or_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "de::f64_or_string")]
    pub longitude: f64,
    #[serde(default)]
    pub current_plastic_kg: f64,
    #[serde(default)]
    pub current_paper_kg: f64,
    #[serde(default)]
    pub current_metal_kg: f64,
    #[serde(default)]
    pub current_glass_kg: f64,
    #[serde(default)]
    pub current_textile_kg: f64,
    #[serde(default)]
    pub current_dry_waste_kg: f64,
    #[serde(default)]
    pub ready_waste_type: Option<WasteType>,
    #[serde(default)]
    pub max_waste_kg: f64,
    /// Km from the query origin; present only when the query was geofiltered.
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub distance: Option<f64>,
}

impl ColonyCandidate {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPoint {
    pub point_id: i64,
    #[serde(default)]
    pub colony_id: Option<i64>,
    pub point_name: String,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub waste_types_accepted: Vec<WasteType>,
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub max_capacity_kg: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_or_string")]
    pub distance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colony_parses_string_coordinates() {
        let colony: ColonyCandidate = serde_json::from_str(
            r#"{
                "colony_id": 12,
                "colony_name": "Jubilee Hills",
                "latitude": "17.4326",
                "longitude": 78.4071,
                "current_plastic_kg": 6.5,
                "ready_waste_type": "plastic",
                "max_waste_kg": 6.5
            }"#,
        )
        .unwrap();

        assert_eq!(colony.colony_id, 12);
        assert_eq!(colony.ready_waste_type, Some(WasteType::Plastic));
        assert_eq!(colony.point().lat, 17.4326);
        assert_eq!(colony.distance, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let colony: ColonyCandidate = serde_json::from_str(
            r#"{
                "colony_id": 3,
                "colony_name": "Begumpet",
                "latitude": 17.44,
                "longitude": 78.46,
                "pincode": "500016",
                "created_at": "2025-01-01T00:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(colony.max_waste_kg, 0.0);
    }
}
