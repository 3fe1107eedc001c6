use dioxus::prelude::*;

use haulquote::domain::{PricingTable, TransportMode};

use crate::ui::{components::estimate_panel::money, theme};

/// Relocation tiers with the tier for the current distance highlighted.
#[component]
pub fn TierTable(
    pricing: PricingTable,
    #[props(!optional)] active: Option<usize>,
    #[props(!optional)] mode: Option<TransportMode>,
) -> Element {
    rsx! {
        table { class: "tier-table",
            thead {
                tr {
                    th { "Distance" }
                    th { class: if mode == Some(TransportMode::Open) { "selected" }, "Open / mile" }
                    th { class: if mode == Some(TransportMode::Enclosed) { "selected" }, "Enclosed / mile" }
                }
            }
            tbody {
                for (index, tier) in pricing.tiers.iter().enumerate() {
                    tr { class: theme::tier_row(active == Some(index)),
                        td { "{tier.label}" }
                        td { "{money(tier.open_rate_per_mile)}" }
                        td { "{money(tier.enclosed_rate_per_mile)}" }
                    }
                }
            }
        }
        p { class: theme::MUTED,
            "Last-mile {money(pricing.last_mile_rate)} / mile, dispatch {money(pricing.dispatch_rate)} / mile."
        }
    }
}
