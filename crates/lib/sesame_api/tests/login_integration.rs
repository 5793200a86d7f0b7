//! Integration test: in-memory store, build router, drive login and token
//! flows end to end.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use sesame_api::config::ApiConfig;
use sesame_api::{AppState, router};
use sesame_core::config::AuthConfig;
use sesame_core::models::auth::Role;
use sesame_core::store::{CredentialStore, MemoryCredentialStore};
use tower::ServiceExt;

const SIGNING_KEY: &str = "integration-test-key";

async fn test_app() -> (Router, AppState) {
    let mut auth = AuthConfig::new(SIGNING_KEY);
    auth.bcrypt_cost = 4;
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: None,
        secure_cookies: false,
        auth,
    };
    let state = AppState::new(Arc::new(MemoryCredentialStore::new()), config)
        .expect("app state");

    state
        .auth
        .provision_user("Susan", "pepito", Role::Pentester, true)
        .await
        .expect("provision susan");
    state
        .auth
        .provision_user("dormant", "sleeping", Role::Client, false)
        .await
        .expect("provision dormant");

    (router(state.clone()), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get_with(uri: &str, name: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

/// Log in and return `(token, session cookie pair)`.
async fn login(app: &Router, identifier: &str, password: &str) -> (String, String) {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": identifier, "password": password }),
        ))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie")
        .to_string();
    let json = body_json(resp).await;
    let token = json["response"]["user"]["authentication_token"]
        .as_str()
        .expect("authentication_token")
        .to_string();
    (token, cookie)
}

#[tokio::test]
async fn login_returns_user_and_token() {
    let (app, _) = test_app().await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "Susan", "password": "pepito" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let user = &json["response"]["user"];
    assert_eq!(user["username"], "Susan");
    assert_eq!(user["role"], "pentester");
    assert!(user["id"].is_string());
    assert!(!user["authentication_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_accepts_username_field_and_any_casing() {
    let (app, _) = test_app().await;

    for name in ["susan", "SUSAN", "sUsAn"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({ "username": name, "password": "pepito" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "identifier {name}");
    }
}

#[tokio::test]
async fn form_encoded_login() {
    let (app, _) = test_app().await;

    let resp = app
        .clone()
        .oneshot(post_form("/login", "email=susan&password=pepito"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["response"]["user"]["username"], "Susan");

    let resp = app
        .clone()
        .oneshot(post_form("/login", "username=SUSAN&password=pepito"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(post_form("/login", "email=susan&password=wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_ascii_identifier_casing_variants_log_in() {
    let (app, state) = test_app().await;
    state
        .auth
        .provision_user("ΟΔΥΣΣΕΥΣ", "ithaca-bound", Role::Client, true)
        .await
        .unwrap();

    for name in ["ΟΔΥΣΣΕΥΣ", "οδυσσευσ", "οδυσσευς", "Οδυσσευς"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({ "email": name, "password": "ithaca-bound" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "identifier {name}");
    }
}

#[tokio::test]
async fn token_works_in_every_header_form() {
    let (app, _) = test_app().await;
    let (token, _) = login(&app, "susan", "pepito").await;

    let forms = [
        ("authorization", format!("Token {token}")),
        ("authorization", format!("Bearer {token}")),
        ("authorization", format!("bearer {token}")),
        ("authorization", format!("TOKEN {token}")),
        ("authentication-token", token.clone()),
    ];
    for (name, value) in forms {
        let resp = app
            .clone()
            .oneshot(get_with("/session", name, &value))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "header {name}");
        let json = body_json(resp).await;
        assert_eq!(json["username"], "Susan");
    }
}

#[tokio::test]
async fn cookie_session_retrieves_usable_token() {
    let (app, _) = test_app().await;
    let (_, cookie) = login(&app, "susan", "pepito").await;

    let resp = app
        .clone()
        .oneshot(get_with("/v2/token/", "cookie", &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fresh = body_json(resp).await;
    let fresh = fresh.as_str().expect("token is a JSON string");

    let resp = app
        .clone()
        .oneshot(get_with("/session", "authentication-token", fresh))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_endpoint_requires_auth() {
    let (app, _) = test_app().await;

    let req = Request::builder()
        .uri("/v2/token/")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bare_user_id_token_is_rejected() {
    let (app, state) = test_app().await;
    let susan = state
        .auth
        .store()
        .find_user_by_identifier("susan")
        .await
        .unwrap()
        .unwrap();

    // Correctly signed, but carries neither expiry nor fingerprint.
    let forged = jsonwebtoken::encode(
        &Header::default(),
        &json!({ "user_id": susan.id.to_string() }),
        &EncodingKey::from_secret(SIGNING_KEY.as_bytes()),
    )
    .unwrap();

    let resp = app
        .oneshot(get_with("/v2/token/", "authentication-token", &forged))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_change_invalidates_old_tokens() {
    let (app, _) = test_app().await;
    let (old, _) = login(&app, "susan", "pepito").await;

    let req = Request::builder()
        .method("POST")
        .uri("/change_password")
        .header(header::CONTENT_TYPE, "application/json")
        .header("authentication-token", &old)
        .body(Body::from(
            json!({ "current_password": "pepito", "new_password": "much-longer-secret" })
                .to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let new = json["authentication_token"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(get_with("/session", "authentication-token", &old))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(get_with("/session", "authentication-token", &new))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(post_json(
            "/login",
            json!({ "email": "susan", "password": "pepito" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn nul_characters_are_not_stripped() {
    let (app, state) = test_app().await;
    state
        .auth
        .provision_user("nully", "pass\u{0}word", Role::Client, true)
        .await
        .unwrap();

    let cases = [
        (json!({ "email": "su\u{0}san", "password": "pepito" }), StatusCode::UNAUTHORIZED),
        (json!({ "email": "susan", "password": "pep\u{0}ito" }), StatusCode::UNAUTHORIZED),
        (json!({ "email": "nully", "password": "password" }), StatusCode::UNAUTHORIZED),
        (json!({ "email": "nully", "password": "pass\u{0}word" }), StatusCode::OK),
    ];
    for (body, expected) in cases {
        let resp = app
            .clone()
            .oneshot(post_json("/login", body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), expected, "body {body}");
    }
}

#[tokio::test]
async fn failures_share_one_response_body() {
    let (app, _) = test_app().await;

    let attempts = [
        json!({ "email": "susan", "password": "wrong" }),
        json!({ "email": "nobody", "password": "pepito" }),
        json!({ "email": "dormant", "password": "sleeping" }),
    ];
    let mut bodies = Vec::new();
    for body in attempts {
        let resp = app.clone().oneshot(post_json("/login", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(resp).await);
    }

    assert_eq!(bodies[0]["message"], "Unauthorized");
    assert!(bodies.iter().all(|b| *b == bodies[0]));
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let (app, _) = test_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("sesame_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}
