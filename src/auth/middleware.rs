//! Route guards that check the session cookie and keep active sessions alive.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
};

/// The parts of [AppState] the auth guards need.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    ///
    /// Each authenticated request extends the session to at least this long from now.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a guard tells the browser to go to the log-in page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogInRedirect {
    /// A 303 redirect for full page loads.
    SeeOther,
    /// An `HX-Redirect` header for htmx form submissions, which ignore 3xx responses.
    Htmx,
}

impl LogInRedirect {
    fn into_response(self, log_in_url: &str) -> Response {
        match self {
            LogInRedirect::SeeOther => Redirect::to(log_in_url).into_response(),
            LogInRedirect::Htmx => {
                (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
            }
        }
    }
}

/// The log-in URL for `request`, falling back to one that returns to the dashboard.
fn log_in_url_for(request: &Request) -> String {
    if let Some(url) = build_log_in_redirect_url(request) {
        return url;
    }

    if request.uri().path().starts_with("/api") {
        tracing::warn!("Missing or invalid htmx headers for /api request, returning to dashboard.");
    } else {
        tracing::warn!("Unsafe redirect target in request URI, returning to dashboard.");
    }

    build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

/// Run `next` for a request with a valid auth cookie, with the [UserID](crate::auth::UserID)
/// as a request extension, and push the session expiry back on the way out.
async fn guard(state: AuthState, request: Request, next: Next, redirect: LogInRedirect) -> Response {
    let log_in_url = log_in_url_for(&request);
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read cookie jar: {error:?}");
            return redirect.into_response(&log_in_url);
        }
    };

    match get_token_from_cookies(&jar) {
        Ok(token) => {
            parts.extensions.insert(token.user_id);
        }
        Err(error) => {
            tracing::debug!("Rejected auth cookie: {error}");
            return redirect.into_response(&log_in_url);
        }
    }

    let response = next.run(Request::from_parts(parts, body)).await;

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration)
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend session, keeping the old cookie: {error:?}");
            jar
        });

    append_set_cookie_headers(response, jar)
}

fn append_set_cookie_headers(response: Response, jar: PrivateCookieJar) -> Response {
    let (mut parts, body) = response.into_parts();
    let jar_response = jar.into_response();

    for value in jar_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Guards page routes. Requests without a valid session get a 303 redirect to the
/// log-in page, which sends the user back to the page they asked for.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::SeeOther).await
}

/// Guards the `/api` routes that htmx forms submit to. Requests without a valid
/// session get an `HX-Redirect` to the log-in page, which sends the user back to
/// the page the form was on.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}
