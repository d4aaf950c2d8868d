use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMethod {
    Saved,
    Current,
    Custom,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedLocation {
    pub point: GeoPoint,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// The single coordinate (or "none") governing geofiltered queries. Exactly
/// one strategy is active at a time; `All` means no geographic filter.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectiveLocation {
    Saved(SavedLocation),
    Current { point: GeoPoint, accuracy_m: f64 },
    Custom { point: GeoPoint, name: String },
    All,
}

impl EffectiveLocation {
    pub fn method(&self) -> LocationMethod {
        match self {
            EffectiveLocation::Saved(_) => LocationMethod::Saved,
            EffectiveLocation::Current { .. } => LocationMethod::Current,
            EffectiveLocation::Custom { .. } => LocationMethod::Custom,
            EffectiveLocation::All => LocationMethod::All,
        }
    }

    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            EffectiveLocation::Saved(saved) => Some(saved.point),
            EffectiveLocation::Current { point, .. } => Some(*point),
            EffectiveLocation::Custom { point, .. } => Some(*point),
            EffectiveLocation::All => None,
        }
    }
}
