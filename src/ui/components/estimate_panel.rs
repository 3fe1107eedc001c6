use dioxus::prelude::*;

use haulquote::domain::EstimateBreakdown;

use crate::ui::theme;

/// `$1,234.56`. Negative amounts never occur in an estimate.
pub fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}.{:02}", cents % 100)
}

#[component]
pub fn EstimatePanel(#[props(!optional)] estimate: Option<EstimateBreakdown>) -> Element {
    let Some(estimate) = estimate else {
        return rsx! {
            section { class: "{theme::PANEL} estimate",
                h2 { class: theme::PANEL_TITLE, "Estimate" }
                p { class: theme::MUTED, "Fill in both ZIP codes, vehicles and distance to see a price." }
            }
        };
    };

    let rows = [
        ("Base rate / mile", money(estimate.base_tier_rate)),
        ("Speed multiplier", format!("×{:.2}", estimate.speed_multiplier)),
        ("Vehicle factor", format!("×{:.2}", estimate.vehicle_factor)),
        ("Applied rate / mile", money(estimate.applied_per_mile)),
        ("Subtotal", money(estimate.subtotal)),
        ("Fuel surcharge (9%)", money(estimate.fuel_surcharge)),
    ];

    rsx! {
        section { class: "{theme::PANEL} estimate",
            h2 { class: theme::PANEL_TITLE, "Estimate" }
            p { class: "estimate-total", "{money(estimate.total)}" }
            p { class: theme::MUTED, "{money(estimate.per_mile)} per mile all-in" }
            dl { class: "breakdown",
                for (label, value) in rows {
                    div { class: "breakdown-row",
                        dt { "{label}" }
                        dd { "{value}" }
                    }
                }
            }
        }
    }
}
