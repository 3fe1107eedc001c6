use dioxus::prelude::*;

use haulquote::{
    domain::{ContactDetails, QuoteDraft, ServiceType, SpeedTier, TransportMode},
    services::{DistanceMode, DistanceStatus, Engine, QuoteOrchestrator, ReviewError, SaveError},
};

use crate::{
    app::{spawn_resolution, LedgerSignal},
    ui::{
        components::{
            estimate_panel::{money, EstimatePanel},
            tier_table::TierTable,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

fn apply_edit(mut orchestrator: Signal<QuoteOrchestrator>, edit: impl FnOnce(&mut QuoteDraft)) {
    let job = orchestrator.with_mut(|o| o.update(edit));
    spawn_resolution(orchestrator, job);
}

#[component]
pub fn QuotePage() -> Element {
    let mut orchestrator = use_context::<Signal<QuoteOrchestrator>>();
    let mut ledger = use_context::<LedgerSignal>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let engine = use_context::<Engine>();
    let mut contact = use_context::<Signal<ContactDetails>>();
    let mut saving = use_signal(|| false);
    let mut reviewing = use_signal(|| false);

    // Pick up a lookup abandoned when the page was last left.
    use_hook(move || {
        let job = orchestrator.with_mut(|o| o.refresh());
        spawn_resolution(orchestrator, job);
    });
    use_drop(move || {
        if let Ok(mut o) = orchestrator.try_write() {
            o.detach();
        }
    });

    let (draft, status, mode, estimate, pricing) = orchestrator.with(|o| {
        (
            o.draft().clone(),
            o.status(),
            o.mode(),
            o.estimate(),
            o.pricing().clone(),
        )
    });
    let has_estimate = estimate.is_some();
    let auto = mode == DistanceMode::Auto;
    let lookup_failed = auto && status == DistanceStatus::Error;
    let (status_class, status_text) = if auto {
        theme::distance_status(status)
    } else {
        ("status status-idle", "Manual entry")
    };
    let relocation = draft.service_type == ServiceType::VehicleRelocation;
    let active_tier = draft
        .distance_miles
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|miles| relocation && *miles > 0.0)
        .and_then(|miles| pricing.tier_index_for(miles));
    let transport_mode = relocation.then_some(draft.transport_mode).flatten();
    let contact_now = contact();
    let review_sent = engine.desk.review_requested();

    let on_save = {
        let desk = engine.desk.clone();
        move |_| {
            if saving() {
                return;
            }
            let desk = desk.clone();
            let draft = orchestrator.with(|o| o.draft().clone());
            let details = contact();
            saving.set(true);
            spawn(async move {
                match desk.save_quote(&draft, &details).await {
                    Ok(finalized) => {
                        let total = money(finalized.entry.total);
                        let offline = finalized.entry.offline;
                        ledger.with_mut(|l| l.add(finalized.entry));
                        let text = match (offline, finalized.reference) {
                            (true, _) => format!("Saved offline: {total}."),
                            (false, Some(reference)) => format!("Quote {reference} saved: {total}."),
                            (false, None) => format!("Quote saved: {total}."),
                        };
                        push_toast(toasts, ToastKind::Success, text);
                        apply_edit(orchestrator, |d| d.notes.clear());
                    }
                    Err(SaveError::Invalid(err)) => push_toast(toasts, ToastKind::Warning, err.to_string()),
                    Err(SaveError::Rejected(message)) => {
                        push_toast(toasts, ToastKind::Error, format!("Quote was not accepted: {message}"))
                    }
                }
                saving.set(false);
            });
        }
    };

    let on_review = {
        let desk = engine.desk.clone();
        move |_| {
            if reviewing() {
                return;
            }
            let desk = desk.clone();
            let draft = orchestrator.with(|o| o.draft().clone());
            let details = contact();
            reviewing.set(true);
            spawn(async move {
                match desk.request_review(&draft, &details).await {
                    Ok(_) => push_toast(
                        toasts,
                        ToastKind::Success,
                        "Sent for manual review. A dispatcher will contact you.",
                    ),
                    Err(ReviewError::AlreadyRequested) => {
                        push_toast(toasts, ToastKind::Info, "A manual review is already on its way.")
                    }
                    Err(err) => push_toast(toasts, ToastKind::Error, err.to_string()),
                }
                reviewing.set(false);
            });
        }
    };

    rsx! {
        div { class: "quote-layout",
            section { class: theme::PANEL,
                h2 { class: theme::PANEL_TITLE, "Shipment" }
                div { class: "grid-2",
                    div { class: "field",
                        label { class: theme::LABEL, "Pickup ZIP" }
                        input {
                            class: theme::INPUT,
                            inputmode: "numeric",
                            maxlength: "5",
                            placeholder: "90210",
                            value: "{draft.origin_zip}",
                            oninput: move |evt| {
                                let value = evt.value();
                                apply_edit(orchestrator, move |d| d.origin_zip = value);
                            },
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Dropoff ZIP" }
                        input {
                            class: theme::INPUT,
                            inputmode: "numeric",
                            maxlength: "5",
                            placeholder: "10001",
                            value: "{draft.destination_zip}",
                            oninput: move |evt| {
                                let value = evt.value();
                                apply_edit(orchestrator, move |d| d.destination_zip = value);
                            },
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Service" }
                        select {
                            class: theme::INPUT,
                            value: draft.service_type.as_str(),
                            onchange: move |evt| {
                                if let Ok(service) = evt.value().parse::<ServiceType>() {
                                    apply_edit(orchestrator, move |d| d.service_type = service);
                                }
                            },
                            for service in ServiceType::ALL {
                                option {
                                    value: service.as_str(),
                                    selected: service == draft.service_type,
                                    "{service.label()}"
                                }
                            }
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Vehicles" }
                        input {
                            class: theme::INPUT,
                            r#type: "number",
                            min: "1",
                            max: "200",
                            value: "{draft.vehicles}",
                            oninput: move |evt| {
                                let value = evt.value();
                                apply_edit(orchestrator, move |d| d.vehicles = value);
                            },
                        }
                    }
                    if relocation {
                        div { class: "field",
                            label { class: theme::LABEL, "Transport" }
                            div { class: "toggle-group",
                                for option in [TransportMode::Open, TransportMode::Enclosed] {
                                    button {
                                        class: theme::btn_toggle(draft.transport_mode == Some(option)),
                                        onclick: move |_| apply_edit(orchestrator, move |d| d.transport_mode = Some(option)),
                                        "{option.label()}"
                                    }
                                }
                            }
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Speed" }
                        div { class: "toggle-group",
                            for option in [SpeedTier::Standard, SpeedTier::Expedited] {
                                button {
                                    class: theme::btn_toggle(draft.speed == option),
                                    onclick: move |_| apply_edit(orchestrator, move |d| d.speed = option),
                                    "{option.label()}"
                                }
                            }
                        }
                    }
                }

                div { class: "field distance-field",
                    div { class: "distance-header",
                        label { class: theme::LABEL, "Distance (miles)" }
                        button {
                            class: theme::btn_toggle(auto),
                            onclick: move |_| {
                                let job = orchestrator.with_mut(|o| o.toggle_mode());
                                spawn_resolution(orchestrator, job);
                            },
                            if auto { "Auto" } else { "Manual" }
                        }
                        span { class: status_class, "{status_text}" }
                    }
                    input {
                        class: theme::INPUT,
                        r#type: "number",
                        min: "1",
                        max: "4000",
                        readonly: auto,
                        value: "{draft.distance_miles}",
                        oninput: move |evt| {
                            let value = evt.value();
                            apply_edit(orchestrator, move |d| d.distance_miles = value);
                        },
                    }
                    if lookup_failed {
                        p { class: theme::MUTED, "Switch to Manual to enter the distance yourself." }
                    }
                }

                div { class: "field",
                    label { class: theme::LABEL, "Notes" }
                    textarea {
                        class: theme::INPUT,
                        maxlength: "400",
                        rows: "3",
                        value: "{draft.notes}",
                        oninput: move |evt| {
                            let value = evt.value();
                            apply_edit(orchestrator, move |d| d.notes = value);
                        },
                    }
                }
            }

            div { class: "quote-side",
                EstimatePanel { estimate }

                if relocation {
                    section { class: theme::PANEL,
                        h2 { class: theme::PANEL_TITLE, "Relocation tiers" }
                        TierTable { pricing: pricing.clone(), active: active_tier, mode: transport_mode }
                    }
                }

                section { class: theme::PANEL,
                    h2 { class: theme::PANEL_TITLE, "Contact" }
                    p { class: theme::MUTED, "Required to save a quote or ask for a manual review." }
                    div { class: "field",
                        label { class: theme::LABEL, "Full name" }
                        input {
                            class: theme::INPUT,
                            value: "{contact_now.full_name}",
                            oninput: move |evt| contact.with_mut(|c| c.full_name = evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Email" }
                        input {
                            class: theme::INPUT,
                            r#type: "email",
                            value: "{contact_now.email}",
                            oninput: move |evt| contact.with_mut(|c| c.email = evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: theme::LABEL, "Phone" }
                        input {
                            class: theme::INPUT,
                            r#type: "tel",
                            value: "{contact_now.phone}",
                            oninput: move |evt| contact.with_mut(|c| c.phone = evt.value()),
                        }
                    }
                    div { class: "actions",
                        button {
                            class: theme::btn_primary(saving()),
                            disabled: saving() || !has_estimate,
                            onclick: on_save,
                            if saving() { "Saving…" } else { "Save quote" }
                        }
                        button {
                            class: theme::BTN_GHOST,
                            disabled: reviewing() || review_sent,
                            onclick: on_review,
                            if review_sent { "Review requested" } else { "Request manual review" }
                        }
                    }
                }
            }
        }
    }
}
