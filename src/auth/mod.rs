//! Username and password log-in, the auth cookie and role checks.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod role;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use redirect::normalize_redirect_url;
pub use role::{Role, require_admin, require_editor};
pub(crate) use token::Token;
pub use user::{
    User, UserID, count_users, create_user, create_user_table, get_user_by_id,
    get_user_by_username,
};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
