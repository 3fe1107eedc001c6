use dioxus::prelude::*;
use time::format_description;

use haulquote::{domain::SavedQuote, services::MAX_SAVED_QUOTES};

use crate::{
    app::LedgerSignal,
    ui::{
        components::{
            estimate_panel::money,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

fn created_label(quote: &SavedQuote) -> String {
    let Ok(format) = format_description::parse("[year]-[month]-[day] [hour]:[minute] UTC") else {
        return String::new();
    };
    quote
        .created_at_utc()
        .and_then(|at| at.format(&format).ok())
        .unwrap_or_default()
}

fn service_label(quote: &SavedQuote) -> String {
    match quote.transport_mode {
        Some(mode) => format!("{} · {}", quote.service_type.label(), mode.label()),
        None => quote.service_type.label().to_string(),
    }
}

#[component]
pub fn SavedQuotesPage() -> Element {
    let mut ledger = use_context::<LedgerSignal>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let quotes = ledger.with(|l| l.list().to_vec());

    if quotes.is_empty() {
        return rsx! {
            section { class: theme::PANEL,
                h2 { class: theme::PANEL_TITLE, "Saved quotes" }
                p { class: theme::MUTED, "Nothing saved yet. Quotes you save appear here, newest first." }
            }
        };
    }

    rsx! {
        section { class: theme::PANEL,
            h2 { class: theme::PANEL_TITLE, "Saved quotes" }
            p { class: theme::MUTED, "Showing {quotes.len()} of at most {MAX_SAVED_QUOTES}." }
            ul { class: "quote-list",
                for quote in quotes {
                    li { key: "{quote.id}", class: "quote-item",
                        div { class: "quote-route",
                            strong { "{quote.origin_zip} → {quote.destination_zip}" }
                            if quote.offline {
                                span { class: "badge badge-offline", title: "Saved while the quote service was unreachable", "offline" }
                            }
                            p { class: theme::MUTED,
                                "{service_label(&quote)} · {quote.speed.label()} · {quote.vehicle_count} vehicle(s) · {quote.distance_miles} mi"
                            }
                            p { class: theme::MUTED, "{created_label(&quote)}" }
                        }
                        div { class: "quote-price",
                            strong { "{money(quote.total)}" }
                            span { class: theme::MUTED, "{money(quote.per_mile)} / mi" }
                        }
                        button {
                            class: theme::BTN_DANGER_SMALL,
                            onclick: {
                                let id = quote.id.clone();
                                move |_| {
                                    if ledger.with_mut(|l| l.remove(&id)) {
                                        push_toast(toasts, ToastKind::Info, "Quote deleted.");
                                    }
                                }
                            },
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}
