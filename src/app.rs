use dioxus::{prelude::*, signals::Signal};
use tracing::error;

use haulquote::{
    domain::ContactDetails,
    services::{Engine, QuoteOrchestrator, ResolutionJob, SavedQuoteLedger},
    util::{assets, settings::load_settings},
};

use crate::ui::{
    components::toast::{Toast, ToastMessage},
    pages::{QuotePage, SavedQuotesPage, SettingsPage},
    shell::Shell,
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    #[route("/quote")]
    Quote {},
    #[route("/saved")]
    SavedQuotes {},
    #[route("/settings")]
    Settings {},
}

#[component]
pub fn App() -> Element {
    let engine = use_hook(|| {
        Engine::from_settings(load_settings()).map_err(|err| {
            error!(error = %err, "failed to start quote engine");
            err.to_string()
        })
    });

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    rsx! {
        document::Link { rel: "icon", href: assets::favicon_data_uri() }
        document::Style { "{assets::main_css()}" }
        match engine {
            Ok(engine) => rsx! { Workspace { engine: EngineHandle(engine) } },
            Err(message) => rsx! {
                div { class: "fatal",
                    h1 { "HaulQuote could not start" }
                    p { "{message}" }
                    p { class: "muted", "Check the endpoints in settings.json and restart." }
                }
            },
        }
        Toast {}
    }
}

/// Engine as a component prop. Engines are built once, so identity of the
/// shared desk is enough for equality.
#[derive(Clone)]
pub struct EngineHandle(pub Engine);

impl PartialEq for EngineHandle {
    fn eq(&self, other: &Self) -> bool {
        std::sync::Arc::ptr_eq(&self.0.desk, &other.0.desk)
    }
}

#[component]
fn Workspace(engine: EngineHandle) -> Element {
    let EngineHandle(engine) = engine;
    let orchestrator = use_signal({
        let engine = engine.clone();
        move || engine.orchestrator()
    });
    let ledger = use_signal({
        let engine = engine.clone();
        move || engine.ledger()
    });
    let contact = use_signal(ContactDetails::default);
    use_context_provider(|| engine.clone());
    use_context_provider(|| contact);
    use_context_provider(|| orchestrator);
    use_context_provider(|| ledger);

    rsx! { Router::<Route> {} }
}

/// Runs a distance lookup on the UI runtime and commits its outcome.
/// Superseded lookups are cancelled by the orchestrator and their outcome is
/// discarded in `apply`.
pub fn spawn_resolution(mut orchestrator: Signal<QuoteOrchestrator>, job: Option<ResolutionJob>) {
    let Some(job) = job else {
        return;
    };
    spawn(async move {
        let outcome = job.run().await;
        orchestrator.with_mut(|o| o.apply(outcome));
    });
}

pub type LedgerSignal = Signal<SavedQuoteLedger>;

#[component]
pub fn Quote() -> Element {
    rsx! { Shell { QuotePage {} } }
}

#[component]
pub fn SavedQuotes() -> Element {
    rsx! { Shell { SavedQuotesPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
