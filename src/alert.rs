//! Toast alerts for displaying success and error messages to users.
//!
//! Alerts are rendered as an out-of-band swap that replaces the
//! `#alert-container` element in the page shell, so any htmx response can
//! carry one regardless of its main swap target.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A message shown to the user in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with details explaining how to fix the problem.
    Error { message: String, details: String },
    /// An error message without details.
    ErrorSimple { message: String },
}

const ALERT_SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 rounded-lg shadow-lg \
    text-green-800 bg-green-50 border border-green-300 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";

const ALERT_ERROR_STYLE: &str = "flex items-start gap-3 p-4 rounded-lg shadow-lg \
    text-red-800 bg-red-50 border border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl Alert {
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (ALERT_SUCCESS_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (ALERT_SUCCESS_STYLE, message, None),
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, Some(details)),
            Alert::ErrorSimple { message } => (ALERT_ERROR_STYLE, message, None),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(style)
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            p class="text-sm mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-auto text-sm font-medium hover:opacity-75"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        render_alert(StatusCode::OK, self)
    }
}

/// Render `alert` as an HTML fragment with the given status code.
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, Html(alert.into_html().into_string())).into_response()
}
