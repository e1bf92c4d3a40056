//! Verifies the identity token issued by the external auth service.

mod cookie;
mod identity;
mod token;
mod user;

pub use cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use identity::Identity;
pub use user::UserID;
