use dioxus::prelude::*;

use haulquote::{
    infra::storage::default_data_dir,
    services::Engine,
    util::settings::{save_settings, settings_path},
};

use crate::ui::{
    components::{
        tier_table::TierTable,
        toast::{push_toast, ToastKind, ToastMessage},
    },
    theme,
};

#[component]
pub fn SettingsPage() -> Element {
    let engine = use_context::<Engine>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let settings = engine.settings.clone();

    let config_path = settings_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    let data_dir = settings
        .data_dir
        .clone()
        .or_else(default_data_dir)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "in memory only".to_string());
    let submission = settings
        .submission_url
        .clone()
        .unwrap_or_else(|| "none, quotes are recorded locally".to_string());
    let distance_mode = if settings.auto_distance { "Auto lookup" } else { "Manual entry" };

    let on_write = {
        let settings = settings.clone();
        move |_| match save_settings(&settings) {
            Ok(path) => push_toast(
                toasts,
                ToastKind::Success,
                format!("Wrote {}. Edit it and restart to apply.", path.display()),
            ),
            Err(err) => push_toast(toasts, ToastKind::Error, format!("Could not write settings: {err}")),
        }
    };

    let rows = [
        ("Settings file", config_path),
        ("Data directory", data_dir),
        ("Geocoder", settings.geocode_base_url.clone()),
        ("Router", settings.routing_base_url.clone()),
        ("Quote endpoint", submission),
        ("Distance on start", distance_mode.to_string()),
    ];

    rsx! {
        div { class: "stack",
            section { class: theme::PANEL,
                h2 { class: theme::PANEL_TITLE, "Configuration" }
                dl { class: "breakdown",
                    for (label, value) in rows {
                        div { class: "breakdown-row",
                            dt { "{label}" }
                            dd { class: "mono", "{value}" }
                        }
                    }
                }
                div { class: "actions",
                    button { class: theme::BTN_GHOST, onclick: on_write, "Write settings file" }
                }
            }

            section { class: theme::PANEL,
                h2 { class: theme::PANEL_TITLE, "Pricing" }
                TierTable { pricing: settings.pricing.clone(), active: None, mode: None }
                p { class: theme::MUTED,
                    "Expedited service costs 25% more. Each additional vehicle adds 55% of the single-vehicle rate. A 9% fuel surcharge applies to every quote."
                }
            }

            section { class: theme::PANEL,
                h2 { class: theme::PANEL_TITLE, "Data attribution" }
                p { class: theme::MUTED,
                    "ZIP coordinates by Zippopotam.us. Driving distances by OSRM using OpenStreetMap data."
                }
            }
        }
    }
}
