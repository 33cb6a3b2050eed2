//! Authentication for the app: users and passwords, the encrypted auth
//! cookie, the middleware that guards protected routes and the log-in,
//! log-out and registration pages.

mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use forgot_password::get_forgot_password_page;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register_user::{get_register_page, register_user};
pub(crate) use token::Token;
pub use user::{
    Email, User, UserID, create_user, create_user_table, get_user_by_email, update_password,
};
