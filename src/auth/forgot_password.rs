use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base, log_in_register},
};

fn forgot_password_template() -> Markup {
    let content = html! {
        p class="text-justify text-gray-900 dark:text-white"
        {
            "To reset your password, go to the directory where this server is
            running from and run the program 'reset_password' with the path to
            your database file and the email address you registered with, e.g. "
            code { "reset_password --db-path app.db --email you@example.com" }
            "."
        }

        p class="text-sm font-light text-gray-500 dark:text-gray-400"
        {
            "Remembered your password? "
            a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in here" }
        }
    };

    base(
        "Forgot Password",
        &[],
        &log_in_register("Forgot your password?", &content),
    )
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
