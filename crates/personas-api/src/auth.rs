//! JWT bearer authentication and the credential directory.
//!
//! Tokens are HS256-signed and validated for signature, issuer, audience,
//! and expiry. A missing or unverifiable token yields 401; a valid token
//! lacking the required role yields 403 — consistently, on every endpoint.

use std::collections::HashMap;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};
use personas_core::store::PersonStore;

// ─── Roles ───────────────────────────────────────────────────────────────────

/// Access role carried in the token. `Admin` may write; every authenticated
/// role may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
  Admin,
  Consultor,
}

// ─── Claims ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Username.
  pub sub:  String,
  pub role: Role,
  pub iss:  String,
  pub aud:  String,
  pub iat:  i64,
  pub exp:  i64,
}

// ─── Token issue/verify ──────────────────────────────────────────────────────

/// Symmetric signing material plus the issuer/audience/lifetime contract.
pub struct JwtAuth {
  issuer:       String,
  audience:     String,
  ttl_secs:     i64,
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
}

impl JwtAuth {
  pub fn new(
    secret: &str,
    issuer: impl Into<String>,
    audience: impl Into<String>,
    ttl_secs: u64,
  ) -> Self {
    Self {
      issuer:       issuer.into(),
      audience:     audience.into(),
      ttl_secs:     ttl_secs as i64,
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
    }
  }

  /// Mint a token for an authenticated user.
  pub fn issue(
    &self,
    username: &str,
    role: Role,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub:  username.to_owned(),
      role,
      iss:  self.issuer.clone(),
      aud:  self.audience.clone(),
      iat:  now,
      exp:  now + self.ttl_secs,
    };
    jsonwebtoken::encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &self.encoding_key,
    )
  }

  /// Validate signature, issuer, audience, and expiry.
  pub fn verify(
    &self,
    token: &str,
  ) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[self.issuer.as_str()]);
    validation.set_audience(&[self.audience.as_str()]);
    let data =
      jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)?;
    Ok(data.claims)
  }
}

// ─── Credential directory ────────────────────────────────────────────────────

/// One entry the login operation can authenticate against.
#[derive(Debug, Clone)]
pub struct Credential {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// Swappable credential lookup. Production deployments can substitute a real
/// identity store without touching the login handler.
pub trait CredentialDirectory: Send + Sync {
  fn lookup(&self, username: &str) -> Option<Credential>;
}

/// In-memory directory built from config entries, or the demo pair.
pub struct StaticCredentials {
  entries: HashMap<String, Credential>,
}

impl StaticCredentials {
  pub fn new(entries: impl IntoIterator<Item = (String, Credential)>) -> Self {
    Self { entries: entries.into_iter().collect() }
  }

  /// The demo pair: `admin`/`admin123` (Admin) and `consultor`/`consultor123`
  /// (Consultor), hashed at startup.
  pub fn demo() -> Result<Self, argon2::password_hash::Error> {
    Ok(Self::new([
      (
        "admin".to_owned(),
        Credential {
          password_hash: hash_password("admin123")?,
          role:          Role::Admin,
        },
      ),
      (
        "consultor".to_owned(),
        Credential {
          password_hash: hash_password("consultor123")?,
          role:          Role::Consultor,
        },
      ),
    ]))
  }
}

impl CredentialDirectory for StaticCredentials {
  fn lookup(&self, username: &str) -> Option<Credential> {
    self.entries.get(username).cloned()
  }
}

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(
  password: &str,
) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Check `password` against a PHC hash. Any parse or verify failure is a
/// plain mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Present in a handler means the request carried a valid bearer token.
pub struct AuthUser(pub Claims);

/// Like [`AuthUser`], but additionally requires the `Admin` role.
pub struct AdminUser(pub Claims);

fn bearer_claims<S>(
  parts: &Parts,
  state: &AppState<S>,
) -> Result<Claims, ApiError>
where
  S: PersonStore,
{
  let header_val = parts
    .headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)?;

  state.auth.verify(token).map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: PersonStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(AuthUser(bearer_claims(parts, state)?))
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: PersonStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let claims = bearer_claims(parts, state)?;
    if claims.role != Role::Admin {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminUser(claims))
  }
}
