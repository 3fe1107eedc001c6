//! Pricing, validation and geometry for quote estimates. Nothing in here
//! performs I/O.

pub mod entities;
pub mod estimate;
pub mod geo;
pub mod pricing;
pub mod saved_quote;

pub use entities::{
    ContactDetails, GeoPoint, QuoteDraft, QuoteInput, ServiceType, SpeedTier, TransportMode,
    ValidationError, ZipCode, ZipPair,
};
pub use estimate::{compute_estimate, rate_estimate, vehicle_factor, EstimateBreakdown};
pub use geo::{approximate_road_miles, haversine_miles, meters_to_miles};
pub use pricing::{PricingTable, PricingTableError, PricingTier};
pub use saved_quote::SavedQuote;
