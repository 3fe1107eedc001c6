//! Per-mile rate lookup.
//!
//! Vehicle relocation is priced by distance band (open vs. enclosed carrier);
//! last-mile and dispatch work use flat per-mile rates. The whole table is
//! plain data so it can be swapped through settings without a rebuild.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{ServiceType, TransportMode};

/// Rate applied to any service the table does not know about.
pub const FALLBACK_RATE_PER_MILE: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_miles: f64,
    /// Inclusive upper bound. `None` marks the open-ended last tier.
    #[serde(default)]
    pub max_miles: Option<f64>,
    pub open_rate_per_mile: f64,
    pub enclosed_rate_per_mile: f64,
    pub label: String,
}

impl PricingTier {
    pub fn contains(&self, distance_miles: f64) -> bool {
        distance_miles >= self.min_miles
            && self
                .max_miles
                .map(|max| distance_miles <= max)
                .unwrap_or(true)
    }

    pub fn rate_for(&self, mode: Option<TransportMode>) -> f64 {
        match mode {
            Some(TransportMode::Enclosed) => self.enclosed_rate_per_mile,
            _ => self.open_rate_per_mile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingTableError {
    #[error("pricing table has no relocation tiers")]
    Empty,
    #[error("first tier must start at 0 miles, found {0}")]
    FirstTierNotAtZero(f64),
    #[error("tier '{label}' has invalid bounds or rates")]
    InvalidTier { label: String },
    #[error("tier '{label}' overlaps or leaves a gap after the previous tier")]
    NotContiguous { label: String },
    #[error("only the last tier may be open-ended")]
    UnboundedBeforeLast,
    #[error("last tier must be open-ended")]
    BoundedLastTier,
    #[error("flat rates must be positive")]
    InvalidFlatRate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub tiers: Vec<PricingTier>,
    pub last_mile_rate: f64,
    pub dispatch_rate: f64,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                PricingTier {
                    min_miles: 0.0,
                    max_miles: Some(600.0),
                    open_rate_per_mile: 1.60,
                    enclosed_rate_per_mile: 2.09,
                    label: "1-600 miles".to_string(),
                },
                PricingTier {
                    min_miles: 601.0,
                    max_miles: Some(1100.0),
                    open_rate_per_mile: 0.85,
                    enclosed_rate_per_mile: 1.20,
                    label: "601-1100 miles".to_string(),
                },
                PricingTier {
                    min_miles: 1101.0,
                    max_miles: None,
                    open_rate_per_mile: 0.70,
                    enclosed_rate_per_mile: 1.10,
                    label: "1100+ miles".to_string(),
                },
            ],
            last_mile_rate: 2.2,
            dispatch_rate: 1.4,
        }
    }
}

impl PricingTable {
    /// First tier containing `distance_miles`, or the last tier when none
    /// does (only reachable for fractional distances between integer bounds).
    pub fn tier_for(&self, distance_miles: f64) -> Option<&PricingTier> {
        self.tiers
            .iter()
            .find(|tier| tier.contains(distance_miles))
            .or_else(|| self.tiers.last())
    }

    pub fn tier_index_for(&self, distance_miles: f64) -> Option<usize> {
        self.tiers
            .iter()
            .position(|tier| tier.contains(distance_miles))
            .or_else(|| self.tiers.len().checked_sub(1))
    }

    pub fn base_rate(
        &self,
        service: ServiceType,
        distance_miles: f64,
        mode: Option<TransportMode>,
    ) -> f64 {
        match service {
            ServiceType::VehicleRelocation => self
                .tier_for(distance_miles)
                .map(|tier| tier.rate_for(mode))
                .unwrap_or(FALLBACK_RATE_PER_MILE),
            ServiceType::LastMile => self.last_mile_rate,
            ServiceType::Dispatch => self.dispatch_rate,
        }
    }

    /// Checks that the tiers partition `[0, inf)`: sorted, starting at zero,
    /// each tier starting at most one mile after the previous inclusive
    /// maximum, and only the last tier unbounded.
    pub fn validate(&self) -> Result<(), PricingTableError> {
        if !(self.last_mile_rate > 0.0 && self.dispatch_rate > 0.0) {
            return Err(PricingTableError::InvalidFlatRate);
        }

        let first = self.tiers.first().ok_or(PricingTableError::Empty)?;
        if first.min_miles != 0.0 {
            return Err(PricingTableError::FirstTierNotAtZero(first.min_miles));
        }

        let last_index = self.tiers.len() - 1;
        let mut previous_max: Option<f64> = None;
        for (index, tier) in self.tiers.iter().enumerate() {
            let rates_ok = tier.open_rate_per_mile > 0.0 && tier.enclosed_rate_per_mile > 0.0;
            let bounds_ok = tier.min_miles.is_finite()
                && tier.max_miles.map(|max| max >= tier.min_miles).unwrap_or(true);
            if !rates_ok || !bounds_ok {
                return Err(PricingTableError::InvalidTier {
                    label: tier.label.clone(),
                });
            }

            if let Some(prev) = previous_max {
                if tier.min_miles <= prev || tier.min_miles > prev + 1.0 {
                    return Err(PricingTableError::NotContiguous {
                        label: tier.label.clone(),
                    });
                }
            }

            match (tier.max_miles, index == last_index) {
                (None, false) => return Err(PricingTableError::UnboundedBeforeLast),
                (Some(_), true) => return Err(PricingTableError::BoundedLastTier),
                _ => {}
            }
            previous_max = tier.max_miles;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_a_partition() {
        assert_eq!(PricingTable::default().validate(), Ok(()));
    }

    #[test]
    fn tier_edges_are_inclusive() {
        let table = PricingTable::default();
        let open = Some(TransportMode::Open);
        let relocation = ServiceType::VehicleRelocation;

        assert_eq!(table.base_rate(relocation, 600.0, open), 1.60);
        assert_eq!(table.base_rate(relocation, 601.0, open), 0.85);
        assert_eq!(table.base_rate(relocation, 1100.0, open), 0.85);
        assert_eq!(table.base_rate(relocation, 1101.0, open), 0.70);
        assert_eq!(table.base_rate(relocation, 0.0, open), 1.60);
        assert_eq!(table.base_rate(relocation, 3999.0, open), 0.70);
    }

    #[test]
    fn enclosed_rates() {
        let table = PricingTable::default();
        let enclosed = Some(TransportMode::Enclosed);
        let relocation = ServiceType::VehicleRelocation;

        assert_eq!(table.base_rate(relocation, 250.0, enclosed), 2.09);
        assert_eq!(table.base_rate(relocation, 1100.0, enclosed), 1.20);
        assert_eq!(table.base_rate(relocation, 2500.0, enclosed), 1.10);
    }

    #[test]
    fn fractional_gap_falls_back_to_last_tier() {
        let table = PricingTable::default();
        assert_eq!(table.tier_index_for(600.5), Some(2));
        assert_eq!(
            table.base_rate(ServiceType::VehicleRelocation, 600.5, Some(TransportMode::Open)),
            0.70
        );
    }

    #[test]
    fn flat_rates_ignore_distance_and_mode() {
        let table = PricingTable::default();
        for distance in [1.0, 600.0, 3000.0] {
            assert_eq!(table.base_rate(ServiceType::LastMile, distance, None), 2.2);
            assert_eq!(
                table.base_rate(ServiceType::Dispatch, distance, Some(TransportMode::Enclosed)),
                1.4
            );
        }
    }

    #[test]
    fn empty_table_uses_fallback_rate() {
        let table = PricingTable {
            tiers: Vec::new(),
            ..PricingTable::default()
        };
        assert_eq!(table.validate(), Err(PricingTableError::Empty));
        assert_eq!(
            table.base_rate(ServiceType::VehicleRelocation, 50.0, None),
            FALLBACK_RATE_PER_MILE
        );
    }

    #[test]
    fn rejects_overlap_gap_and_bounded_tail() {
        let mut table = PricingTable::default();
        table.tiers[1].min_miles = 600.0;
        assert!(matches!(
            table.validate(),
            Err(PricingTableError::NotContiguous { .. })
        ));

        let mut table = PricingTable::default();
        table.tiers[1].min_miles = 650.0;
        assert!(matches!(
            table.validate(),
            Err(PricingTableError::NotContiguous { .. })
        ));

        let mut table = PricingTable::default();
        table.tiers[2].max_miles = Some(5000.0);
        assert_eq!(table.validate(), Err(PricingTableError::BoundedLastTier));

        let mut table = PricingTable::default();
        table.tiers[0].min_miles = 1.0;
        assert_eq!(table.validate(), Err(PricingTableError::FirstTierNotAtZero(1.0)));
    }

    #[test]
    fn table_deserializes_with_open_ended_tail() {
        let json = r#"{
            "tiers": [
                {"min_miles": 0, "max_miles": 500, "open_rate_per_mile": 1.5, "enclosed_rate_per_mile": 2.0, "label": "short"},
                {"min_miles": 501, "open_rate_per_mile": 0.9, "enclosed_rate_per_mile": 1.3, "label": "long"}
            ],
            "last_mile_rate": 2.0,
            "dispatch_rate": 1.2
        }"#;
        let table: PricingTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(
            table.base_rate(ServiceType::VehicleRelocation, 501.0, Some(TransportMode::Enclosed)),
            1.3
        );
    }
}
