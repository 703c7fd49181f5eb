//! Router-level tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory store seeded with the demo data.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{
  AppState, router,
  auth::{Claims, JwtAuth, Role, StaticCredentials},
};
use personas_core::service::PersonService;
use personas_store_sqlite::{SqliteStore, seed};

const SECRET: &str = "test-secret";
const ISSUER: &str = "personas";
const AUDIENCE: &str = "personas-users";

async fn test_app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("store");
  seed::seed_demo_data(&store).await.expect("seed");

  let state = AppState {
    service:     PersonService::new(Arc::new(store)),
    auth:        Arc::new(JwtAuth::new(SECRET, ISSUER, AUDIENCE, 3600)),
    credentials: Arc::new(StaticCredentials::demo().expect("demo creds")),
  };
  router(state)
}

fn token(role: Role) -> String {
  JwtAuth::new(SECRET, ISSUER, AUDIENCE, 3600)
    .issue("test-user", role)
    .expect("token")
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
  let mut builder = Request::builder().method(Method::GET).uri(path);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  builder.body(Body::empty()).expect("request")
}

fn send_json(
  method: Method,
  path: &str,
  token: Option<&str>,
  body: &Value,
) -> Request<Body> {
  let mut builder = Request::builder()
    .method(method)
    .uri(path)
    .header(header::CONTENT_TYPE, "application/json");
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  builder.body(Body::from(body.to_string())).expect("request")
}

async fn body_json(response: Response) -> Value {
  let bytes = to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("body");
  serde_json::from_slice(&bytes).expect("json body")
}

// ─── Health & login ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_auth() {
  let app = test_app().await;
  let response = app.oneshot(get("/health", None)).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn login_returns_usable_token() {
  let app = test_app().await;

  let response = app
    .clone()
    .oneshot(send_json(
      Method::POST,
      "/api/auth/login",
      None,
      &json!({ "username": "admin", "password": "admin123" }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let body = body_json(response).await;
  assert_eq!(body["role"], "Admin");
  assert_eq!(body["username"], "admin");
  let token = body["token"].as_str().expect("token string").to_owned();

  let response = app
    .oneshot(get("/api/personas", Some(&token)))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
  let app = test_app().await;

  for body in [
    json!({ "username": "admin", "password": "wrong" }),
    json!({ "username": "nobody", "password": "admin123" }),
  ] {
    let response = app
      .clone()
      .oneshot(send_json(Method::POST, "/api/auth/login", None, &body))
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }
}

// ─── Auth boundary ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_and_invalid_tokens_are_unauthorized() {
  let app = test_app().await;

  let response =
    app.clone().oneshot(get("/api/personas", None)).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

  let response = app
    .clone()
    .oneshot(get("/api/personas", Some("garbage")))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
  let app = test_app().await;

  let now = chrono::Utc::now().timestamp();
  let claims = Claims {
    sub:  "test-user".to_owned(),
    role: Role::Admin,
    iss:  ISSUER.to_owned(),
    aud:  AUDIENCE.to_owned(),
    iat:  now - 7200,
    exp:  now - 3600,
  };
  let stale = jsonwebtoken::encode(
    &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
    &claims,
    &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
  )
  .unwrap();

  let response =
    app.oneshot(get("/api/personas", Some(&stale))).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn consultor_reads_but_cannot_write() {
  let app = test_app().await;
  let consultor = token(Role::Consultor);

  let response = app
    .clone()
    .oneshot(get("/api/personas", Some(&consultor)))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let response = app
    .clone()
    .oneshot(send_json(
      Method::POST,
      "/api/personas/search",
      Some(&consultor),
      &json!({}),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let response = app
    .oneshot(send_json(
      Method::POST,
      "/api/personas",
      Some(&consultor),
      &json!({
        "fullName": "Ana Ruiz",
        "identification": "99900011",
        "age": 40,
        "gender": "Femenino",
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ─── CRUD flow ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_create_update_delete_flow() {
  let app = test_app().await;
  let admin = token(Role::Admin);

  // Create.
  let response = app
    .clone()
    .oneshot(send_json(
      Method::POST,
      "/api/personas",
      Some(&admin),
      &json!({
        "fullName": "Ana Ruiz",
        "identification": "99900011",
        "age": 40,
        "gender": "Femenino",
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);

  let created = body_json(response).await;
  assert_eq!(created["status"], "Active");
  assert_eq!(created["attributeDetails"], json!([]));
  assert_eq!(created["modifiedAt"], Value::Null);
  let id = created["id"].as_str().expect("id").to_owned();

  // Read back.
  let response = app
    .clone()
    .oneshot(get(&format!("/api/personas/{id}"), Some(&admin)))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(body_json(response).await["fullName"], "Ana Ruiz");

  // Update.
  let response = app
    .clone()
    .oneshot(send_json(
      Method::PUT,
      &format!("/api/personas/{id}"),
      Some(&admin),
      &json!({
        "fullName": "Ana Ruiz de León",
        "identification": "99900011",
        "age": 41,
        "gender": "Femenino",
        "status": "Inactive",
        "extraAttributes": { "Drives": true },
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let updated = body_json(response).await;
  assert_eq!(updated["fullName"], "Ana Ruiz de León");
  assert_eq!(updated["status"], "Inactive");
  assert_eq!(updated["extraAttributes"], json!({ "Drives": true }));
  assert!(updated["modifiedAt"].is_string());

  // Delete.
  let response = app
    .clone()
    .oneshot(
      Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/personas/{id}"))
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NO_CONTENT);

  // Gone.
  let response = app
    .oneshot(get(&format!("/api/personas/{id}"), Some(&admin)))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_identification_is_bad_request() {
  let app = test_app().await;
  let admin = token(Role::Admin);

  // 12345678 is taken by the seeded Juan.
  let response = app
    .oneshot(send_json(
      Method::POST,
      "/api/personas",
      Some(&admin),
      &json!({
        "fullName": "Impostor",
        "identification": "12345678",
        "age": 30,
        "gender": "Masculino",
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_errors_are_field_level() {
  let app = test_app().await;
  let admin = token(Role::Admin);

  let response = app
    .oneshot(send_json(
      Method::POST,
      "/api/personas",
      Some(&admin),
      &json!({
        "fullName": "",
        "identification": "99900011",
        "age": 0,
        "gender": "Femenino",
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let body = body_json(response).await;
  let errors = body["errors"].as_array().expect("errors array");
  assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("fullName")));
  assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("age")));
}

#[tokio::test]
async fn unknown_person_is_not_found() {
  let app = test_app().await;
  let admin = token(Role::Admin);
  let id = uuid::Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(get(&format!("/api/personas/{id}"), Some(&admin)))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);

  let response = app
    .oneshot(send_json(
      Method::PUT,
      &format!("/api/personas/{id}"),
      Some(&admin),
      &json!({
        "fullName": "Nadie",
        "identification": "00000001",
        "age": 20,
        "gender": "Femenino",
        "status": "Active",
      }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ─── Search & validation endpoints ───────────────────────────────────────────

#[tokio::test]
async fn search_filters_by_status_and_min_age() {
  let app = test_app().await;
  let consultor = token(Role::Consultor);

  // Seeded: Juan (35) and María (28), both Active.
  let response = app
    .oneshot(send_json(
      Method::POST,
      "/api/personas/search",
      Some(&consultor),
      &json!({ "status": "Active", "minAge": 30 }),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let body = body_json(response).await;
  let results = body.as_array().expect("array");
  assert_eq!(results.len(), 1);
  assert_eq!(results[0]["identification"], "12345678");
  assert_eq!(results[0]["age"], 35);
}

#[tokio::test]
async fn validate_identificacion_endpoint() {
  let app = test_app().await;
  let consultor = token(Role::Consultor);

  let response = app
    .clone()
    .oneshot(get(
      "/api/personas/validate-identificacion/12345678",
      Some(&consultor),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(body_json(response).await, json!({ "isValid": false }));

  // Find Juan's id and exclude it.
  let response = app
    .clone()
    .oneshot(get("/api/personas", Some(&consultor)))
    .await
    .unwrap();
  let list = body_json(response).await;
  let juan = list
    .as_array()
    .unwrap()
    .iter()
    .find(|p| p["identification"] == "12345678")
    .expect("seeded Juan");
  let juan_id = juan["id"].as_str().unwrap();

  let response = app
    .clone()
    .oneshot(get(
      &format!(
        "/api/personas/validate-identificacion/12345678?excludeId={juan_id}"
      ),
      Some(&consultor),
    ))
    .await
    .unwrap();
  assert_eq!(body_json(response).await, json!({ "isValid": true }));

  let response = app
    .oneshot(get(
      "/api/personas/validate-identificacion/55512345",
      Some(&consultor),
    ))
    .await
    .unwrap();
  assert_eq!(body_json(response).await, json!({ "isValid": true }));
}

#[tokio::test]
async fn seeded_list_carries_both_attribute_channels() {
  let app = test_app().await;
  let consultor = token(Role::Consultor);

  let response =
    app.oneshot(get("/api/personas", Some(&consultor))).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let list = body_json(response).await;
  let juan = list
    .as_array()
    .unwrap()
    .iter()
    .find(|p| p["identification"] == "12345678")
    .expect("seeded Juan")
    .clone();

  // Denormalised document and normalised rows travel side by side.
  assert_eq!(juan["extraAttributes"]["Blood Type"], "O+");
  let details = juan["attributeDetails"].as_array().unwrap();
  assert_eq!(details.len(), 1);
  assert_eq!(details[0]["attributeName"], "Blood Type");
  assert_eq!(details[0]["dataKind"], "text");
  assert_eq!(details[0]["value"], "O+");
}
