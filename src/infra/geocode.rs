//! ZIP -> coordinate lookup against a Zippopotam-style service
//! (`GET <base>/<zip>` returning `{"places": [{"latitude": "..", "longitude": ".."}]}`).

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{GeoPoint, ZipCode};

pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://api.zippopotam.us/us/";
pub(crate) const USER_AGENT: &str = concat!("haulquote/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lookup for {zip} returned HTTP {status}")]
    Status { zip: String, status: u16 },
    #[error("malformed lookup response for {zip}: {reason}")]
    Malformed { zip: String, reason: String },
}

#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Single attempt, no retry. Dropping the future aborts the request.
    async fn resolve_zip(&self, zip: &ZipCode) -> Result<GeoPoint, GeocodeError>;
}

#[derive(Clone)]
pub struct ZippopotamClient {
    http: Client,
    base_url: Url,
}

impl ZippopotamClient {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_base_url(DEFAULT_GEOCODE_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, GeocodeError> {
        let base_url = Url::parse(&with_trailing_slash(base))?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl GeocodeResolver for ZippopotamClient {
    async fn resolve_zip(&self, zip: &ZipCode) -> Result<GeoPoint, GeocodeError> {
        let url = self.base_url.join(zip.as_str())?;
        debug!(target: "geocode", %url, "looking up ZIP");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status {
                zip: zip.to_string(),
                status: status.as_u16(),
            });
        }

        let body: LookupDto = response.json().await.map_err(|err| GeocodeError::Malformed {
            zip: zip.to_string(),
            reason: err.to_string(),
        })?;
        body.into_point().map_err(|reason| GeocodeError::Malformed {
            zip: zip.to_string(),
            reason,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LookupDto {
    #[serde(default)]
    places: Option<Vec<PlaceDto>>,
}

#[derive(Debug, Deserialize)]
struct PlaceDto {
    latitude: String,
    longitude: String,
}

impl LookupDto {
    fn into_point(self) -> Result<GeoPoint, String> {
        let place = self
            .places
            .and_then(|places| places.into_iter().next())
            .ok_or_else(|| "response has no places".to_string())?;
        let latitude = parse_coordinate(&place.latitude, "latitude")?;
        let longitude = parse_coordinate(&place.longitude, "longitude")?;
        Ok(GeoPoint::new(latitude, longitude))
    }
}

fn parse_coordinate(raw: &str, field: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("{field} '{raw}' is not a number"))
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
pub(crate) fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zip(raw: &str) -> ZipCode {
        ZipCode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn resolves_first_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/us/90210"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "post code": "90210",
                "places": [
                    {"place name": "Beverly Hills", "latitude": "34.0901", "longitude": "-118.4065"},
                    {"place name": "Elsewhere", "latitude": "0", "longitude": "0"}
                ]
            })))
            .mount(&server)
            .await;

        let client = ZippopotamClient::with_base_url(&format!("{}/us", server.uri())).unwrap();
        let point = client.resolve_zip(&zip("90210")).await.unwrap();
        assert_eq!(point, GeoPoint::new(34.0901, -118.4065));
    }

    #[tokio::test]
    async fn unknown_zip_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = ZippopotamClient::with_base_url(&server.uri()).unwrap();
        let err = client.resolve_zip(&zip("00000")).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn missing_places_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"post code": "12345"})))
            .mount(&server)
            .await;

        let client = ZippopotamClient::with_base_url(&server.uri()).unwrap();
        let err = client.resolve_zip(&zip("12345")).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[tokio::test]
    async fn non_numeric_latitude_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "places": [{"latitude": "north", "longitude": "-73.99"}]
            })))
            .mount(&server)
            .await;

        let client = ZippopotamClient::with_base_url(&server.uri()).unwrap();
        let err = client.resolve_zip(&zip("10001")).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }
}
