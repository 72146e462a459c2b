//! View state and its projection to a screen.
//!
//! DESIGN
//! ======
//! [`screen`] is a pure function of [`ViewState`]. The three screens are
//! mutually exclusive; `Redirecting` and `Authenticated` are terminal for a
//! mount. Layout is deliberately plain text.

use std::fmt::Write;

use serde::Serialize;

use crate::profile::{LOADING, UserProfile};

pub const TITLE: &str = "Test Application - TryLoop";
pub const STATUS_CHECKING: &str = "Checking...";
pub const STATUS_VALID: &str = "Valid session cookie found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub loading: bool,
    pub authenticated: bool,
    pub session_status: String,
    pub user_data: Option<UserProfile>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { loading: true, authenticated: false, session_status: STATUS_CHECKING.to_string(), user_data: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    Loading { status: &'a str },
    Redirecting { status: &'a str },
    Authenticated { status: &'a str, rows: Vec<(&'static str, &'a str)> },
}

/// Pick the screen for `state`.
#[must_use]
pub fn screen(state: &ViewState) -> Screen<'_> {
    let status = state.session_status.as_str();
    if state.loading {
        Screen::Loading { status }
    } else if !state.authenticated {
        Screen::Redirecting { status }
    } else {
        Screen::Authenticated { status, rows: profile_rows(state.user_data.as_ref()) }
    }
}

const PROFILE_LABELS: [&str; 7] = ["UID", "Email", "Name", "Organization", "Role", "Stage", "Status"];

/// Label/value pairs for the profile table; unknown profile reads "Loading...".
#[must_use]
pub fn profile_rows(profile: Option<&UserProfile>) -> Vec<(&'static str, &str)> {
    let Some(p) = profile else {
        return PROFILE_LABELS.iter().map(|label| (*label, LOADING)).collect();
    };
    let values = [&p.uid, &p.email, &p.name, &p.org, &p.role, &p.stage, &p.status];
    PROFILE_LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| (*label, value.as_str()))
        .collect()
}

/// Plain-text rendering of a screen.
#[must_use]
pub fn render_text(screen: &Screen<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    match screen {
        Screen::Loading { status } => {
            let _ = writeln!(out, "Loading authentication status...");
            let _ = writeln!(out, "{status}");
        }
        Screen::Redirecting { status } => {
            let _ = writeln!(out, "{status}");
            let _ = writeln!(out, "Redirecting to login...");
        }
        Screen::Authenticated { status, rows } => {
            let _ = writeln!(out, "Successfully authenticated!");
            let _ = writeln!(out, "{status}");
            let _ = writeln!(out);
            let _ = writeln!(out, "User Information");
            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            for (label, value) in rows {
                let _ = writeln!(out, "  {:<width$}  {value}", format!("{label}:"), width = width + 1);
            }
        }
    }
    out
}

/// Passes a rendered screen through only when it differs from the last one.
#[derive(Debug, Default)]
pub struct DistinctScreens {
    last: Option<String>,
}

impl DistinctScreens {
    /// Render `state`; `None` if it looks the same as the previous screen.
    pub fn next(&mut self, state: &ViewState) -> Option<String> {
        let text = render_text(&screen(state));
        if self.last.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.last = Some(text.clone());
        Some(text)
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
