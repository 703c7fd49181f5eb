//! Handlers for `/api/personas` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/personas` | any authenticated role |
//! | `GET`    | `/personas/{id}` | 404 if not found |
//! | `POST`   | `/personas` | Admin only; 201 |
//! | `PUT`    | `/personas/{id}` | Admin only |
//! | `DELETE` | `/personas/{id}` | Admin only; 204 |
//! | `POST`   | `/personas/search` | filter body; 200 + array |
//! | `GET`    | `/personas/validate-identificacion/{value}` | `?excludeId=` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminUser, AuthUser},
  error::ApiError,
};
use personas_core::{
  person::{PersonDraft, SearchFilter},
  store::PersonStore,
  view::PersonView,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/personas`
pub async fn list<S>(
  _user: AuthUser,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.list_all().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/personas/{id}`
pub async fn get_one<S>(
  _user: AuthUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + 'static,
{
  let person = state
    .service
    .get_by_id(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/personas` — 201 + the created view.
pub async fn create<S>(
  _user: AdminUser,
  State(state): State<AppState<S>>,
  Json(draft): Json<PersonDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
{
  let person = state.service.create(draft).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/personas/{id}`
pub async fn update<S>(
  _user: AdminUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(draft): Json<PersonDraft>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.update(id, draft).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/personas/{id}` — 204 on success.
pub async fn delete_one<S>(
  _user: AdminUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + 'static,
{
  state.service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Search ───────────────────────────────────────────────────────────────────

/// `POST /api/personas/search` — filter body, 200 with a (possibly empty)
/// array.
pub async fn search<S>(
  _user: AuthUser,
  State(state): State<AppState<S>>,
  Json(filter): Json<SearchFilter>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.search(&filter).await?))
}

// ─── Validate identification ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateParams {
  pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
  pub is_valid: bool,
}

/// `GET /api/personas/validate-identificacion/{value}[?excludeId=<id>]`
pub async fn validate_identification<S>(
  _user: AuthUser,
  State(state): State<AppState<S>>,
  Path(value): Path<String>,
  Query(params): Query<ValidateParams>,
) -> Result<Json<ValidateResponse>, ApiError>
where
  S: PersonStore + 'static,
{
  let is_valid = state
    .service
    .is_identification_available(&value, params.exclude_id)
    .await?;
  Ok(Json(ValidateResponse { is_valid }))
}
