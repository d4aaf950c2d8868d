use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: String,
    pub collector_radius_km: f64,
    pub citizen_radius_km: f64,
    pub max_pickups: u32,
    pub max_radius_km: f64,
    pub collector_email: Option<String>,
    pub collector_password: Option<String>,
    pub device_lat: Option<f64>,
    pub device_lng: Option<f64>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            collector_radius_km: parse_or_default("COLLECTOR_RADIUS_KM", 500.0)?,
            citizen_radius_km: parse_or_default("CITIZEN_RADIUS_KM", 25.0)?,
            max_pickups: parse_or_default("MAX_PICKUPS", 5)?,
            max_radius_km: parse_or_default("MAX_RADIUS_KM", 25.0)?,
            collector_email: env::var("COLLECTOR_EMAIL").ok(),
            collector_password: env::var("COLLECTOR_PASSWORD").ok(),
            device_lat: parse_optional("DEVICE_LAT")?,
            device_lng: parse_optional("DEVICE_LNG")?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn parse_optional<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(None),
    }
}
