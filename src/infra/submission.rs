//! Remote sink for finalized quotes and manual-review requests.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::saved_quote::now_millis;
use crate::domain::{
    ContactDetails, EstimateBreakdown, QuoteDraft, QuoteInput, ServiceType, SpeedTier,
    TransportMode,
};
use crate::infra::geocode::USER_AGENT;

/// Stand-in shipment weight per vehicle until the sink accepts vehicle counts.
pub const KG_PER_VEHICLE: u32 = 600;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

impl SubmissionError {
    /// The sink never saw the request (as opposed to refusing it).
    pub fn is_network(&self) -> bool {
        matches!(self, SubmissionError::Network(_))
    }
}

/// Flat payload accepted by the quote endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    pub name: String,
    pub email: String,
    pub origin: String,
    pub destination: String,
    pub weight_kg: u32,
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl QuoteSubmission {
    pub fn new(input: &QuoteInput, full_name: &str, email: &str, notes: &str) -> Self {
        let notes = notes.trim();
        Self {
            name: full_name.trim().to_string(),
            email: email.trim().to_string(),
            origin: input.origin_zip.to_string(),
            destination: input.destination_zip.to_string(),
            weight_kg: input.vehicle_count.saturating_mul(KG_PER_VEHICLE).max(1),
            mode: "road".to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }

    /// Best-effort payload for a draft that may not validate yet. Fields the
    /// draft lacks stay empty and the sink reports them.
    pub fn from_draft(draft: &QuoteDraft, contact: &ContactDetails) -> Self {
        let vehicles = draft
            .vehicles
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|count| *count > 0)
            .unwrap_or(1);
        let notes = draft.notes.trim();
        Self {
            name: contact.full_name.trim().to_string(),
            email: contact.email.trim().to_string(),
            origin: draft.origin_zip.trim().to_string(),
            destination: draft.destination_zip.trim().to_string(),
            weight_kg: vehicles.saturating_mul(KG_PER_VEHICLE),
            mode: "road".to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

/// The quote payload plus the rest of the form and the current estimate,
/// flagged for a human to price.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(flatten)]
    pub quote: QuoteSubmission,
    pub phone: String,
    pub vehicles: String,
    pub distance_miles: String,
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
    pub speed: SpeedTier,
    pub estimate: Option<EstimateBreakdown>,
    pub manual_review: bool,
}

impl ReviewRequest {
    pub fn new(
        draft: &QuoteDraft,
        contact: &ContactDetails,
        estimate: Option<EstimateBreakdown>,
    ) -> Self {
        Self {
            quote: QuoteSubmission::from_draft(draft, contact),
            phone: contact.phone.trim().to_string(),
            vehicles: draft.vehicles.clone(),
            distance_miles: draft.distance_miles.clone(),
            service_type: draft.service_type,
            transport_mode: draft.transport_mode,
            speed: draft.speed,
            estimate,
            manual_review: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference: Option<String>,
}

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit_quote(&self, quote: &QuoteSubmission) -> Result<SubmissionReceipt, SubmissionError>;
    async fn request_review(&self, request: &ReviewRequest) -> Result<SubmissionReceipt, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct SinkResponseDto {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// POSTs JSON to a configured endpoint.
#[derive(Clone)]
pub struct HttpSubmissionSink {
    http: Client,
    endpoint: Url,
}

impl HttpSubmissionSink {
    pub fn new(endpoint: &str) -> Result<Self, SubmissionError> {
        let endpoint = Url::parse(endpoint)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, endpoint })
    }

    async fn post<T: Serialize + Sync>(&self, body: &T) -> Result<SubmissionReceipt, SubmissionError> {
        debug!(target: "submission", endpoint = %self.endpoint, "posting");
        let response = self.http.post(self.endpoint.clone()).json(body).send().await?;
        let status = response.status();
        let parsed = response.json::<SinkResponseDto>().await.ok();

        match parsed {
            Some(dto) if status.is_success() && dto.ok => {
                info!(target: "submission", reference = ?dto.reference, "accepted");
                Ok(SubmissionReceipt {
                    reference: dto.reference,
                })
            }
            Some(dto) => Err(SubmissionError::Rejected(
                dto.error
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            )),
            None => Err(SubmissionError::Rejected("Malformed response".to_string())),
        }
    }
}

#[async_trait]
impl SubmissionSink for HttpSubmissionSink {
    async fn submit_quote(&self, quote: &QuoteSubmission) -> Result<SubmissionReceipt, SubmissionError> {
        self.post(quote).await
    }

    async fn request_review(&self, request: &ReviewRequest) -> Result<SubmissionReceipt, SubmissionError> {
        self.post(request).await
    }
}

/// In-process sink used when no endpoint is configured. Applies the quote
/// endpoint's own checks and mints a `Q-` reference.
#[derive(Clone, Debug, Default)]
pub struct LoopbackSink;

impl LoopbackSink {
    fn check_required(quote: &QuoteSubmission) -> Result<(), SubmissionError> {
        let fields = [
            ("name", quote.name.is_empty()),
            ("email", quote.email.is_empty()),
            ("origin", quote.origin.is_empty()),
            ("destination", quote.destination.is_empty()),
            ("weightKg", quote.weight_kg == 0),
            ("mode", quote.mode.is_empty()),
        ];
        match fields.iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(SubmissionError::Rejected(format!("Missing field: {field}"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SubmissionSink for LoopbackSink {
    async fn submit_quote(&self, quote: &QuoteSubmission) -> Result<SubmissionReceipt, SubmissionError> {
        Self::check_required(quote)?;
        let reference = new_reference();
        info!(target: "submission", %reference, "quote recorded locally");
        Ok(SubmissionReceipt {
            reference: Some(reference),
        })
    }

    async fn request_review(&self, request: &ReviewRequest) -> Result<SubmissionReceipt, SubmissionError> {
        Self::check_required(&request.quote)?;
        let reference = new_reference();
        info!(target: "submission", %reference, "review request recorded locally");
        Ok(SubmissionReceipt {
            reference: Some(reference),
        })
    }
}

/// `Q-` followed by the current Unix time in milliseconds, base 36.
pub fn new_reference() -> String {
    format!("Q-{}", to_base36(now_millis().max(0) as u64))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submission() -> QuoteSubmission {
        let draft = QuoteDraft {
            origin_zip: "90210".into(),
            destination_zip: "10001".into(),
            vehicles: "3".into(),
            ..QuoteDraft::default()
        };
        QuoteSubmission::new(&draft.validate().unwrap(), "Dana Lee", "dana@example.com", "")
    }

    #[test]
    fn payload_shape() {
        let quote = submission();
        assert_eq!(quote.weight_kg, 1800);
        assert_eq!(quote.mode, "road");
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["weightKg"], 1800);
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn base36_matches_reference_format() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert!(new_reference().starts_with("Q-"));
    }

    #[tokio::test]
    async fn accepted_submission_returns_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/quote"))
            .and(body_partial_json(serde_json::json!({"origin": "90210", "weightKg": 1800})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "reference": "Q-lx3k2a"
            })))
            .mount(&server)
            .await;

        let sink = HttpSubmissionSink::new(&format!("{}/api/quote", server.uri())).unwrap();
        let receipt = sink.submit_quote(&submission()).await.unwrap();
        assert_eq!(receipt.reference.as_deref(), Some("Q-lx3k2a"));
    }

    #[tokio::test]
    async fn rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "Missing field: email"})),
            )
            .mount(&server)
            .await;

        let sink = HttpSubmissionSink::new(&server.uri()).unwrap();
        let err = sink.submit_quote(&submission()).await.unwrap_err();
        assert!(!err.is_network());
        assert_eq!(err.to_string(), "Missing field: email");
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let sink = HttpSubmissionSink::new(&server.uri()).unwrap();
        let err = sink.submit_quote(&submission()).await.unwrap_err();
        assert_eq!(err.to_string(), "Malformed response");
    }

    #[tokio::test]
    async fn unreachable_sink_is_a_network_error() {
        let sink = HttpSubmissionSink::new("http://127.0.0.1:9/api/quote").unwrap();
        let err = sink.submit_quote(&submission()).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn loopback_requires_fields() {
        let sink = LoopbackSink;
        let receipt = sink.submit_quote(&submission()).await.unwrap();
        assert!(receipt.reference.unwrap().starts_with("Q-"));

        let mut missing = submission();
        missing.email.clear();
        let err = sink.submit_quote(&missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing field: email");
    }

    #[tokio::test]
    async fn loopback_review_carries_quote_fields() {
        let draft = QuoteDraft {
            origin_zip: "90210".into(),
            destination_zip: "10001".into(),
            vehicles: "abc".into(),
            ..QuoteDraft::default()
        };
        let contact = ContactDetails {
            full_name: "Dana Lee".into(),
            email: "dana@example.com".into(),
            phone: "555-010-2030".into(),
        };
        let request = ReviewRequest::new(&draft, &contact, None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["name"], "Dana Lee");
        assert_eq!(json["origin"], "90210");
        assert_eq!(json["weightKg"], 600);
        assert_eq!(json["mode"], "road");
        assert_eq!(json["manualReview"], true);
        assert!(LoopbackSink.request_review(&request).await.is_ok());

        let mut missing = request;
        missing.quote.destination.clear();
        let err = LoopbackSink.request_review(&missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing field: destination");
    }
}
