use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::api::schemas::{
    CollectionPointsResponse, CollectorLocationResponse, ColoniesResponse, ErrorBody,
    LoginResponse, RouteSuggestionsResponse, TimeSlotsResponse,
};
use crate::api::token::TokenStore;
use crate::error::AppError;
use crate::models::colony::{CollectionPoint, ColonyCandidate, WasteType};
use crate::models::location::{GeoPoint, SavedLocation};
use crate::models::route::{RouteBatchRequest, RouteSuggestion, ScheduleReceipt, TimeSlot};

/// A coordinate constraint for list queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    pub point: GeoPoint,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionQuery {
    pub max_pickups: u32,
    pub max_radius_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPointQuery {
    pub filter: Option<GeoFilter>,
    pub waste_types: Vec<WasteType>,
}

/// Typed client for the waste-management backend. One instance is shared by
/// every orchestrator; requests attach the stored bearer token when present.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), AppError> {
        let url = self.endpoint("/collector/login", &[])?;
        let body = serde_json::json!({ "email": email, "password": password });
        let response: LoginResponse = self.post_json(url, &body).await?;
        self.tokens.set(response.access_token);
        Ok(())
    }

    pub fn logout(&self) {
        self.tokens.clear();
    }

    pub async fn collector_location(&self) -> Result<Option<SavedLocation>, AppError> {
        let url = self.endpoint("/collector/location", &[])?;
        let response: CollectorLocationResponse = self.get_json(url).await?;
        Ok(response.location.and_then(|dto| dto.into_saved()))
    }

    pub async fn update_collector_location(
        &self,
        point: GeoPoint,
        address: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<(), AppError> {
        let url = self.endpoint("/collector/location", &[])?;
        let body = serde_json::json!({
            "latitude": point.lat,
            "longitude": point.lng,
            "address": address,
            "city": city,
            "state": state,
        });
        let _: serde_json::Value = self.put_json(url, &body).await?;
        Ok(())
    }

    pub async fn ready_colonies(
        &self,
        filter: Option<&GeoFilter>,
    ) -> Result<Vec<ColonyCandidate>, AppError> {
        let params = ready_colony_params(filter);
        let url = self.endpoint("/collector/ready-colonies", &params)?;
        let response: ColoniesResponse = self.get_json(url).await?;
        Ok(response.colonies)
    }

    pub async fn nearby_colonies(
        &self,
        filter: &GeoFilter,
    ) -> Result<Vec<ColonyCandidate>, AppError> {
        let params = nearby_colony_params(filter);
        let url = self.endpoint("/colony/nearby", &params)?;
        let response: ColoniesResponse = self.get_json(url).await?;
        Ok(response.colonies)
    }

    pub async fn collection_points(
        &self,
        query: &CollectionPointQuery,
    ) -> Result<Vec<CollectionPoint>, AppError> {
        let params = collection_point_params(query);
        let url = self.endpoint("/collection-points/", &params)?;
        let response: CollectionPointsResponse = self.get_json(url).await?;
        Ok(response.collection_points)
    }

    pub async fn route_suggestions(
        &self,
        query: &SuggestionQuery,
    ) -> Result<Vec<RouteSuggestion>, AppError> {
        let params = suggestion_params(query);
        let url = self.endpoint("/booking/route-suggestions", &params)?;
        let response: RouteSuggestionsResponse = self.get_json(url).await?;

        let routes = response
            .routes
            .into_iter()
            .filter(|route| {
                let well_ordered = route.has_contiguous_order();
                if !well_ordered {
                    warn!(
                        route_id = route.route_id,
                        "discarding route with non-contiguous stop order"
                    );
                }
                well_ordered
            })
            .collect();
        Ok(routes)
    }

    pub async fn time_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, AppError> {
        let url = self.endpoint("/booking/time-slots", &[("date", date.to_string())])?;
        let response: TimeSlotsResponse = self.get_json(url).await?;
        Ok(response.time_slots)
    }

    pub async fn schedule_route(
        &self,
        request: &RouteBatchRequest,
    ) -> Result<ScheduleReceipt, AppError> {
        let url = self.endpoint("/booking/schedule-route", &[])?;
        self.post_json(url, request).await
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|err| AppError::Internal(format!("invalid url for {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        debug!(url = %url, "GET");
        let mut request = self.http.get(url);
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, AppError> {
        debug!(url = %url, "POST");
        let mut request = self.http.post(url).json(body);
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, AppError> {
        debug!(url = %url, "PUT");
        let mut request = self.http.put(url).json(body);
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| AppError::Transport(format!("malformed response: {err}")));
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.into_message(status.as_u16()),
            Err(_) => format!("request failed with status {status}"),
        };
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn ready_colony_params(filter: Option<&GeoFilter>) -> Vec<(&'static str, String)> {
    match filter {
        Some(filter) => vec![
            ("lat", filter.point.lat.to_string()),
            ("lon", filter.point.lng.to_string()),
            ("radius", filter.radius_km.to_string()),
        ],
        None => Vec::new(),
    }
}

fn nearby_colony_params(filter: &GeoFilter) -> Vec<(&'static str, String)> {
    vec![
        ("lat", filter.point.lat.to_string()),
        ("lon", filter.point.lng.to_string()),
        ("radius", filter.radius_km.to_string()),
    ]
}

// This endpoint keys longitude as `lng`, unlike the colony queries.
fn collection_point_params(query: &CollectionPointQuery) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = query
        .waste_types
        .iter()
        .map(|waste| ("waste_types", waste.as_str().to_string()))
        .collect();

    if let Some(filter) = &query.filter {
        params.push(("lat", filter.point.lat.to_string()));
        params.push(("lng", filter.point.lng.to_string()));
        params.push(("radius", filter.radius_km.to_string()));
    }
    params
}

fn suggestion_params(query: &SuggestionQuery) -> Vec<(&'static str, String)> {
    vec![
        ("max_pickups", query.max_pickups.to_string()),
        ("max_radius", query.max_radius_km.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(radius_km: f64) -> GeoFilter {
        GeoFilter {
            point: GeoPoint {
                lat: 17.38,
                lng: 78.48,
            },
            radius_km,
        }
    }

    #[test]
    fn collector_filter_sends_lat_lon_radius() {
        let params = ready_colony_params(Some(&filter(500.0)));
        assert_eq!(
            params,
            vec![
                ("lat", "17.38".to_string()),
                ("lon", "78.48".to_string()),
                ("radius", "500".to_string()),
            ]
        );
    }

    #[test]
    fn show_all_sends_no_location_params() {
        assert!(ready_colony_params(None).is_empty());
    }

    #[test]
    fn citizen_filter_uses_25_km() {
        let params = nearby_colony_params(&filter(25.0));
        assert!(params.contains(&("radius", "25".to_string())));
    }

    #[test]
    fn collection_point_params_repeat_waste_types_and_key_lng() {
        let query = CollectionPointQuery {
            filter: Some(filter(25.0)),
            waste_types: vec![WasteType::Plastic, WasteType::Glass],
        };
        let params = collection_point_params(&query);
        assert_eq!(
            params,
            vec![
                ("waste_types", "plastic".to_string()),
                ("waste_types", "glass".to_string()),
                ("lat", "17.38".to_string()),
                ("lng", "78.48".to_string()),
                ("radius", "25".to_string()),
            ]
        );
    }

    #[test]
    fn collection_point_params_omit_location_when_unfiltered() {
        let query = CollectionPointQuery {
            filter: None,
            waste_types: Vec::new(),
        };
        assert!(collection_point_params(&query).is_empty());
    }

    #[test]
    fn suggestion_params_use_wire_names() {
        let params = suggestion_params(&SuggestionQuery {
            max_pickups: 5,
            max_radius_km: 25.0,
        });
        assert_eq!(
            params,
            vec![
                ("max_pickups", "5".to_string()),
                ("max_radius", "25".to_string()),
            ]
        );
    }
}
