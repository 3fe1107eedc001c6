use serde::Serialize;

use super::entities::{QuoteDraft, QuoteInput, SpeedTier};
use super::pricing::PricingTable;

pub const FUEL_SURCHARGE_RATE: f64 = 0.09;
pub const EXPEDITED_MULTIPLIER: f64 = 1.25;
/// Each vehicle beyond the first adds 55% of the single-vehicle rate.
pub const ADDITIONAL_VEHICLE_FACTOR: f64 = 0.55;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBreakdown {
    pub base_tier_rate: f64,
    pub speed_multiplier: f64,
    pub vehicle_factor: f64,
    pub applied_per_mile: f64,
    pub subtotal: f64,
    pub fuel_surcharge: f64,
    pub total: f64,
    pub per_mile: f64,
}

pub fn speed_multiplier(speed: SpeedTier) -> f64 {
    match speed {
        SpeedTier::Standard => 1.0,
        SpeedTier::Expedited => EXPEDITED_MULTIPLIER,
    }
}

pub fn vehicle_factor(vehicle_count: u32) -> f64 {
    1.0 + (vehicle_count.saturating_sub(1)) as f64 * ADDITIONAL_VEHICLE_FACTOR
}

pub fn rate_estimate(input: &QuoteInput, pricing: &PricingTable) -> EstimateBreakdown {
    let base_tier_rate =
        pricing.base_rate(input.service_type, input.distance_miles, input.transport_mode);
    let speed_multiplier = speed_multiplier(input.speed);
    let vehicle_factor = vehicle_factor(input.vehicle_count);
    let applied_per_mile = base_tier_rate * speed_multiplier * vehicle_factor;
    let subtotal = input.distance_miles * applied_per_mile;
    let fuel_surcharge = subtotal * FUEL_SURCHARGE_RATE;
    let total = subtotal + fuel_surcharge;

    EstimateBreakdown {
        base_tier_rate,
        speed_multiplier,
        vehicle_factor,
        applied_per_mile,
        subtotal,
        fuel_surcharge,
        total,
        per_mile: total / input.distance_miles,
    }
}

/// Instant estimate for whatever the form currently holds; `None` while the
/// draft does not validate.
pub fn compute_estimate(draft: &QuoteDraft, pricing: &PricingTable) -> Option<EstimateBreakdown> {
    draft
        .validate()
        .ok()
        .map(|input| rate_estimate(&input, pricing))
}
