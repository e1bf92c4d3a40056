use std::sync::Arc;

use axum::{Router, extract::Path, routing::post};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, Error, build_router,
    auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, set_auth_cookie},
    engine::EngineConfig,
    observer::NoopObserver,
};

const TEST_LOG_IN_ROUTE: &str = "/test/log_in/{user_id}";

/// A server over a fresh in-memory database, plus the state it shares.
///
/// The server has an extra route that issues an auth cookie for any user ID,
/// standing in for the service that logs users in.
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let state = AppState::new(
        connection,
        "nafstenoas",
        EngineConfig::default(),
        Arc::new(NoopObserver),
    )
    .expect("Could not create app state.");

    let log_in_route = Router::new()
        .route(TEST_LOG_IN_ROUTE, post(stub_log_in))
        .with_state(state.cookie_key.clone());
    let app = log_in_route.merge(build_router(state.clone()));

    let server = TestServer::try_new(app).expect("Could not create test server.");

    (server, state)
}

async fn stub_log_in(
    jar: PrivateCookieJar,
    Path(user_id): Path<i64>,
) -> Result<PrivateCookieJar, Error> {
    set_auth_cookie(jar, UserID::new(user_id), DEFAULT_COOKIE_DURATION)
}

/// Get an auth cookie for `user_id` from a server made by [get_test_server].
pub(crate) async fn log_in(server: &TestServer, user_id: UserID) -> Cookie<'static> {
    let response = server
        .post(&TEST_LOG_IN_ROUTE.replace("{user_id}", &user_id.to_string()))
        .await;

    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}
