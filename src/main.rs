use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pickup_planner::api::client::{ApiClient, SuggestionQuery};
use pickup_planner::api::token::InMemoryTokenStore;
use pickup_planner::booking::RoutePlanner;
use pickup_planner::config::Config;
use pickup_planner::error::AppError;
use pickup_planner::feed::{ColonyFeed, Role};
use pickup_planner::models::location::GeoPoint;
use pickup_planner::resolver::{LocationResolver, PositionFix, StaticPositionSource};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let tokens = Arc::new(InMemoryTokenStore::new());
    let api = Arc::new(ApiClient::new(config.api_base_url.clone(), tokens));

    if let (Some(email), Some(password)) = (&config.collector_email, &config.collector_password) {
        api.login(email, password).await?;
        tracing::info!("collector logged in");
    } else {
        tracing::warn!("no collector credentials configured, requests go out unauthenticated");
    }

    let device_fix = match (config.device_lat, config.device_lng) {
        (Some(lat), Some(lng)) => Some(PositionFix {
            point: GeoPoint { lat, lng },
            accuracy_m: 0.0,
        }),
        _ => None,
    };
    let positions = Arc::new(StaticPositionSource::new(device_fix));

    let resolver = LocationResolver::new(api.clone(), positions);
    resolver.load_saved_location().await;
    let snapshot = resolver.snapshot();
    tracing::info!(method = ?snapshot.effective.method(), "effective location resolved");
    if let Some(error) = &snapshot.error {
        tracing::warn!(error = %error, "location filter degraded");
    }

    let feed = ColonyFeed::new(api.clone(), Role::Collector).with_radius(config.collector_radius_km);
    if feed.refresh(&snapshot.effective).await.is_ok() {
        for colony in feed.colonies() {
            tracing::info!(
                colony = %colony.colony_name,
                waste = ?colony.ready_waste_type,
                kg = colony.max_waste_kg,
                distance_km = colony.distance,
                "ready for pickup"
            );
        }
    }

    let planner = RoutePlanner::new(api.clone());
    let query = SuggestionQuery {
        max_pickups: config.max_pickups,
        max_radius_km: config.max_radius_km,
    };
    if planner.load_suggestions(&query).await.is_ok() {
        match planner.selected_route() {
            Some(route) => tracing::info!(
                route_id = route.route_id,
                stops = route.pickups.len(),
                total_distance_km = route.total_distance,
                efficiency = route.efficiency_score,
                "best route suggestion"
            ),
            None => tracing::info!("no pickup opportunities available right now"),
        }
    }

    if planner.load_time_slots().await.is_ok() {
        for slot in planner.time_slots() {
            tracing::info!(slot = %slot.slot, label = %slot.label, available = slot.available, "time slot");
        }
    }

    Ok(())
}
