use dioxus::prelude::*;

use haulquote::util::version::{version_label, APP_NAME};

use crate::app::Route;
use crate::ui::theme;

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let nav = use_navigator();
    let version = version_label();

    rsx! {
        div { class: "app-shell",
            header { class: "app-header",
                div { class: "brand",
                    h1 { "{APP_NAME}" }
                    p { class: "{theme::MUTED}", "Instant quotes for last-mile, dispatch and vehicle relocation" }
                }
                nav { class: "nav",
                    NavButton { active: matches!(current_route, Route::Quote {}), onclick: move |_| { nav.push(Route::Quote {}); }, label: "Quote" }
                    NavButton { active: matches!(current_route, Route::SavedQuotes {}), onclick: move |_| { nav.push(Route::SavedQuotes {}); }, label: "Saved" }
                    NavButton { active: matches!(current_route, Route::Settings {}), onclick: move |_| { nav.push(Route::Settings {}); }, label: "Settings" }
                }
            }
            main { class: "page",
                {children}
            }
            footer { class: "app-footer {theme::MUTED}", "{APP_NAME} {version}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::nav_button(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
