//! Reading and writing the identity token in a private (encrypted) cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID, auth::token::Token};

/// The name of the cookie holding the serialised [Token].
pub const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add an auth cookie for `user_id` to the cookie jar that expires `duration` from now.
///
/// The application never logs users in itself. This is the seam used by the
/// service that does (and by tests) to issue a token this server will accept.
///
/// # Errors
///
/// Returns an [Error::Validation] if the token could not be serialised.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::Validation(format!("could not serialise token: {error}")))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Read the token from the cookie jar.
///
/// Returns `None` if the cookie is missing, could not be decrypted, or does not hold a token.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Option<Token> {
    let cookie = jar.get(COOKIE_TOKEN)?;

    match serde_json::from_str(cookie.value_trimmed()) {
        Ok(token) => Some(token),
        Err(error) => {
            tracing::warn!("Could not parse auth token: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::auth::{
        UserID,
        cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, get_token_from_cookies, set_auth_cookie},
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn set_cookie_then_read_token() {
        let user_id = UserID::new(123);

        let jar = set_auth_cookie(get_jar(), user_id, DEFAULT_COOKIE_DURATION).unwrap();
        let token = get_token_from_cookies(&jar).expect("token should be set");

        assert_eq!(token.user_id, user_id);
        let want_expiry = OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION;
        assert!(
            (token.expires_at - want_expiry).abs() < Duration::seconds(1),
            "got expiry {:?}, want {:?}",
            token.expires_at,
            want_expiry
        );
    }

    #[test]
    fn auth_cookie_flags() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn missing_cookie_has_no_token() {
        assert_eq!(get_token_from_cookies(&get_jar()), None);
    }

    #[test]
    fn garbage_cookie_has_no_token() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "not json"));

        assert_eq!(get_token_from_cookies(&jar), None);
    }
}
