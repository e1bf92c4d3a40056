//! Extracts the caller's identity from the request cookies.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{UserID, cookie::get_token_from_cookies},
};

/// The identity of the caller, if the request carried a valid, unexpired token.
///
/// Extraction never fails. Handlers decide whether an anonymous caller is an
/// error by calling [Identity::require].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Option<UserID>);

impl Identity {
    /// The authenticated user, or [Error::Unauthorized] if there is none.
    pub fn require(self) -> Result<UserID, Error> {
        self.0.ok_or(Error::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        let now = OffsetDateTime::now_utc();

        let user_id = get_token_from_cookies(&jar).and_then(|token| {
            if token.is_valid_at(now) {
                Some(token.user_id)
            } else {
                tracing::debug!("Ignoring expired token for user {}", token.user_id);
                None
            }
        });

        Ok(Identity(user_id))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, extract::Path, routing::get, routing::post};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{
        Error,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Identity, UserID, set_auth_cookie},
    };

    async fn whoami(identity: Identity) -> Result<Json<Value>, Error> {
        let user_id = identity.require()?;

        Ok(Json(json!({ "user_id": user_id })))
    }

    async fn stub_log_in_route(
        jar: PrivateCookieJar,
        Path(user_id): Path<i64>,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(user_id), DEFAULT_COOKIE_DURATION)
    }

    async fn stub_expired_log_in_route(jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), Duration::seconds(-5))
    }

    fn get_test_server() -> TestServer {
        let hash = Sha512::digest("nafstenoas");
        let key = Key::from(&hash);

        let app = Router::new()
            .route("/whoami", get(whoami))
            .route("/log_in/{user_id}", post(stub_log_in_route))
            .route("/log_in_expired", post(stub_expired_log_in_route))
            .with_state(key);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let server = get_test_server();
        let token_cookie = server.post("/log_in/7").await.cookie(COOKIE_TOKEN);

        let response = server.get("/whoami").add_cookie(token_cookie).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "user_id": 7 }));
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let server = get_test_server();

        let response = server.get("/whoami").await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({
            "error": "UNAUTHORIZED",
            "message": "no authenticated user for this request"
        }));
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let server = get_test_server();
        let response = server.post("/log_in_expired").await;
        let jar = response.cookies();

        let response = server.get("/whoami").add_cookies(jar).await;

        response.assert_status_unauthorized();
    }
}
