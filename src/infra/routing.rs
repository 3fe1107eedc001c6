//! Driving distance between two coordinates.
//!
//! The primary path asks an OSRM-compatible router
//! (`GET <base>/<lon>,<lat>;<lon>,<lat>?overview=false`). Whenever that fails
//! in any way the distance is approximated from the great-circle path, so
//! [`resolve_distance`] itself never fails.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{approximate_road_miles, meters_to_miles, GeoPoint};
use crate::infra::geocode::{with_trailing_slash, USER_AGENT};

pub const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org/route/v1/driving/";

/// The routing service could not produce a distance. Recovered internally.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("router returned HTTP {0}")]
    Status(u16),
    #[error("router response has no numeric distance")]
    MissingDistance,
}

#[async_trait]
pub trait RouteResolver: Send + Sync {
    /// Driving distance of the first route, in meters.
    async fn route_meters(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, RouteError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceSource {
    Route,
    GreatCircle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDistance {
    pub miles: u32,
    pub source: DistanceSource,
}

pub async fn resolve_distance(
    router: &dyn RouteResolver,
    from: GeoPoint,
    to: GeoPoint,
) -> RouteDistance {
    match router.route_meters(from, to).await {
        Ok(meters) => RouteDistance {
            miles: meters_to_miles(meters),
            source: DistanceSource::Route,
        },
        Err(err) => {
            let miles = approximate_road_miles(from, to);
            warn!(target: "routing", error = %err, miles, "route unavailable, using great-circle estimate");
            RouteDistance {
                miles,
                source: DistanceSource::GreatCircle,
            }
        }
    }
}

#[derive(Clone)]
pub struct OsrmClient {
    http: Client,
    base_url: Url,
}

impl OsrmClient {
    pub fn new() -> Result<Self, RouteError> {
        Self::with_base_url(DEFAULT_ROUTING_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, RouteError> {
        let base_url = Url::parse(&with_trailing_slash(base))?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    fn route_url(&self, from: GeoPoint, to: GeoPoint) -> Result<Url, url::ParseError> {
        let coordinates = format!(
            "{},{};{},{}",
            from.longitude, from.latitude, to.longitude, to.latitude
        );
        let mut url = self.base_url.join(&coordinates)?;
        url.query_pairs_mut().append_pair("overview", "false");
        Ok(url)
    }
}

#[async_trait]
impl RouteResolver for OsrmClient {
    async fn route_meters(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, RouteError> {
        let url = self.route_url(from, to)?;
        debug!(target: "routing", %url, "requesting route");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        serde_json::from_value::<RouteResponseDto>(body)
            .ok()
            .and_then(RouteResponseDto::first_distance)
            .ok_or(RouteError::MissingDistance)
    }
}

#[derive(Debug, Deserialize)]
struct RouteResponseDto {
    #[serde(default)]
    routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    #[serde(default)]
    distance: Option<serde_json::Value>,
}

impl RouteResponseDto {
    fn first_distance(self) -> Option<f64> {
        self.routes
            .into_iter()
            .next()?
            .distance?
            .as_f64()
            .filter(|meters| meters.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::haversine_miles;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn origin() -> GeoPoint {
        GeoPoint::new(34.0901, -118.4065)
    }

    fn destination() -> GeoPoint {
        GeoPoint::new(40.7484, -73.9967)
    }

    fn fallback_miles() -> u32 {
        ((haversine_miles(origin(), destination()) * 1.15).round() as u32).max(1)
    }

    #[tokio::test]
    async fn uses_first_route_distance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/route/v1/driving/-118.4065,34.0901;-73.9967,40.7484"))
            .and(query_param("overview", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "Ok",
                "routes": [{"distance": 4_506_000.0}, {"distance": 1.0}]
            })))
            .mount(&server)
            .await;

        let router =
            OsrmClient::with_base_url(&format!("{}/route/v1/driving", server.uri())).unwrap();
        let distance = resolve_distance(&router, origin(), destination()).await;
        assert_eq!(
            distance,
            RouteDistance {
                miles: 2800,
                source: DistanceSource::Route
            }
        );
    }

    #[tokio::test]
    async fn server_error_falls_back_to_great_circle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let router = OsrmClient::with_base_url(&server.uri()).unwrap();
        let distance = resolve_distance(&router, origin(), destination()).await;
        assert_eq!(distance.source, DistanceSource::GreatCircle);
        assert_eq!(distance.miles, fallback_miles());
    }

    #[tokio::test]
    async fn missing_or_non_numeric_distance_falls_back() {
        for body in [
            serde_json::json!({"code": "NoRoute", "routes": []}),
            serde_json::json!({"routes": [{"distance": "4506000"}]}),
            serde_json::json!({"message": "unexpected"}),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let router = OsrmClient::with_base_url(&server.uri()).unwrap();
            let distance = resolve_distance(&router, origin(), destination()).await;
            assert_eq!(distance.source, DistanceSource::GreatCircle);
            assert_eq!(distance.miles, fallback_miles());
        }
    }

    #[tokio::test]
    async fn unreachable_router_falls_back() {
        // Nothing listens on port 9 of localhost in the test environment.
        let router = OsrmClient::with_base_url("http://127.0.0.1:9/route/v1/driving/").unwrap();
        let distance = resolve_distance(&router, origin(), destination()).await;
        assert_eq!(distance.source, DistanceSource::GreatCircle);
    }
}
