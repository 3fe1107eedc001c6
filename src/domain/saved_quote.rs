use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::entities::{QuoteInput, ServiceType, SpeedTier, TransportMode, ZipCode};
use super::estimate::EstimateBreakdown;

/// A finalized estimate as kept in the local ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedQuote {
    pub id: String,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
    pub origin_zip: ZipCode,
    pub destination_zip: ZipCode,
    pub service_type: ServiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
    pub speed: SpeedTier,
    pub vehicle_count: u32,
    pub distance_miles: f64,
    pub total: f64,
    pub per_mile: f64,
    /// Saved locally because the submission sink could not be reached.
    #[serde(default)]
    pub offline: bool,
}

impl SavedQuote {
    pub fn new(input: &QuoteInput, estimate: &EstimateBreakdown, offline: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now_millis(),
            origin_zip: input.origin_zip.clone(),
            destination_zip: input.destination_zip.clone(),
            service_type: input.service_type,
            transport_mode: input.transport_mode,
            speed: input.speed,
            vehicle_count: input.vehicle_count,
            distance_miles: input.distance_miles,
            total: estimate.total,
            per_mile: estimate.per_mile,
            offline,
        }
    }

    pub fn created_at_utc(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(self.created_at as i128 * 1_000_000).ok()
    }
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
