//! Shared HTTP harness for integration tests.
//!
//! Builds the `/api/v1` surface over an in-memory marketplace exactly as the
//! server does, minus the cookie `Secure` flag.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};

use buddy_backend::Trace;
use buddy_backend::domain::{MemberId, Role};
use buddy_backend::inbound::http::error::{json_config, query_config};
use buddy_backend::inbound::http::routes;
use buddy_backend::inbound::http::state::HttpState;
use buddy_backend::test_support::identity_token;

pub trait Api: Service<Request, Response = ServiceResponse, Error = actix_web::Error> {}

impl<T> Api for T where T: Service<Request, Response = ServiceResponse, Error = actix_web::Error> {}

pub async fn init_api(state: HttpState) -> impl Api {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(routes::configure)),
    )
    .await
}

pub struct Member {
    pub cookie: Cookie<'static>,
    pub id: MemberId,
}

pub async fn sign_in(app: &impl Api, role: Role) -> Member {
    let (token, id) = identity_token(role);
    let response = test::call_service(
        app,
        TestRequest::post()
            .uri("/api/v1/session")
            .set_json(json!({ "identityToken": token }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();
    Member { cookie, id }
}

/// Send a request as `member` and decode the envelope.
pub async fn send(
    app: &impl Api,
    member: &Member,
    request: TestRequest,
) -> (StatusCode, Value) {
    let response = test::call_service(app, request.cookie(member.cookie.clone()).to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub fn id_of(body: &Value, pointer: &str) -> String {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("no string at {pointer} in {body}"))
        .to_owned()
}
