//! Class names shared across pages. Rules live in `assets/main.css`.

use haulquote::services::DistanceStatus;

pub const PANEL: &str = "panel";
pub const PANEL_TITLE: &str = "panel-title";
pub const LABEL: &str = "field-label";
pub const INPUT: &str = "input";
pub const MUTED: &str = "muted";

pub fn btn_primary(busy: bool) -> &'static str {
    if busy {
        "btn btn-primary busy"
    } else {
        "btn btn-primary"
    }
}

pub const BTN_GHOST: &str = "btn btn-ghost";
pub const BTN_DANGER_SMALL: &str = "btn btn-small btn-danger";

pub fn btn_toggle(active: bool) -> &'static str {
    if active {
        "btn btn-small btn-toggle active"
    } else {
        "btn btn-small btn-toggle"
    }
}

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-btn active"
    } else {
        "nav-btn"
    }
}

pub fn tier_row(active: bool) -> &'static str {
    if active {
        "tier-row active"
    } else {
        "tier-row"
    }
}

pub fn distance_status(status: DistanceStatus) -> (&'static str, &'static str) {
    match status {
        DistanceStatus::Idle => ("status status-idle", "Waiting for both ZIP codes"),
        DistanceStatus::Calculating => ("status status-busy", "Calculating…"),
        DistanceStatus::Done => ("status status-done", "Auto-filled"),
        DistanceStatus::Error => ("status status-error", "Lookup failed, enter miles manually"),
    }
}
