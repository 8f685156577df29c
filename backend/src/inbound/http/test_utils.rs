//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::domain::{MemberId, Role};
use crate::inbound::http::error::{json_config, query_config};
use crate::inbound::http::routes;
use crate::inbound::http::state::HttpState;
use crate::test_support::identity_token;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Initialise the full `/api/v1` surface over `state`.
pub async fn init_api(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(routes::configure)),
    )
    .await
}

/// Signed-in member for request tests.
pub struct TestSession {
    pub cookie: Cookie<'static>,
    pub member_id: MemberId,
}

/// Establish a session for a fresh member with `role`.
pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    role: Role,
) -> TestSession {
    let (token, member_id) = identity_token(role);
    let request = test::TestRequest::post()
        .uri("/api/v1/session")
        .set_json(json!({ "identityToken": token }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK, "login for {role}");
    let cookie = response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();
    TestSession { cookie, member_id }
}

/// Send `request` and decode the JSON envelope.
pub async fn call_json(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: Request,
) -> (StatusCode, Value) {
    let response = test::call_service(app, request).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Shorthand for `body["data"][key]` as a string.
pub fn data_str<'a>(body: &'a Value, key: &str) -> &'a str {
    body["data"][key].as_str().unwrap_or_default()
}
