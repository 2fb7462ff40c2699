//! Bearer-token authentication and the `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: [`Registration`]; 201 with `{token, member}` |
//! | `POST` | `/auth/login` | Body: `{"username","password"}`; 200 with `{token, member}` |
//!
//! Every other route runs the [`Auth`] extractor. A request without an
//! `Authorization` header is a guest; a header that is present but does not
//! carry a valid token is rejected with 401.

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{StatusCode, header, request::Parts},
  response::IntoResponse,
};
use bbs_core::{
  access::Viewer,
  member::{Member, Registration, Role},
  store::BoardStore,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{ApiState, Payload, error::ApiError};

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// JWT claims. `sub` is the member id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub:  Uuid,
  pub role: Role,
  pub iat:  i64,
  pub exp:  i64,
}

/// Signing settings for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub secret: String,
  pub ttl:    Duration,
}

impl AuthConfig {
  pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
    Self { secret: secret.into(), ttl }
  }

  /// Issue an HS256 token for `member`.
  pub fn issue(&self, member: &Member) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      sub:  member.member_id,
      role: member.role,
      iat:  now.timestamp(),
      exp:  (now + self.ttl).timestamp(),
    };
    encode(
      &Header::default(),
      &claims,
      &EncodingKey::from_secret(self.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(Box::new(e)))
  }

  /// Check signature and expiry.
  pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.secret.as_bytes()),
      &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
      jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
        ApiError::Unauthorized("token expired".into())
      }
      _ => ApiError::Unauthorized("invalid token".into()),
    })
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The [`Viewer`] behind a request.
pub struct Auth(pub Viewer);

impl<S> FromRequestParts<ApiState<S>> for Auth
where
  S: BoardStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
      return Ok(Auth(Viewer::Guest));
    };

    let token = value
      .to_str()
      .ok()
      .and_then(|v| v.strip_prefix("Bearer "))
      .ok_or_else(|| {
        warn!("malformed authorization header");
        ApiError::Unauthorized("expected a bearer token".into())
      })?;

    let claims = state.auth.verify(token.trim()).inspect_err(|e| {
      warn!(error = %e, "rejected bearer token");
    })?;
    Ok(Auth(Viewer::member(claims.sub, claims.role)))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
  pub token:  String,
  pub member: Member,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  Payload(body): Payload<Registration>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore + 'static,
{
  let member = state.forum.register(body).await?;
  let token = state.auth.issue(&member)?;
  Ok((StatusCode::CREATED, Json(Session { token, member })))
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<ApiState<S>>,
  Payload(body): Payload<LoginBody>,
) -> Result<Json<Session>, ApiError>
where
  S: BoardStore + 'static,
{
  let member = state.forum.authenticate(&body.username, &body.password).await?;
  let token = state.auth.issue(&member)?;
  Ok(Json(Session { token, member }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use bbs_core::{entity::now, member::AccountStatus};

  fn member(role: Role) -> Member {
    let at = now();
    Member {
      member_id:      Uuid::new_v4(),
      username:       "alice".into(),
      email:          "alice@example.com".into(),
      display_name:   None,
      role,
      account_status: AccountStatus::Active,
      created_at:     at,
      updated_at:     at,
    }
  }

  #[test]
  fn issued_tokens_verify() {
    let cfg = AuthConfig::new("secret", Duration::minutes(5));
    let m = member(Role::Moderator);
    let claims = cfg.verify(&cfg.issue(&m).unwrap()).unwrap();
    assert_eq!(claims.sub, m.member_id);
    assert_eq!(claims.role, Role::Moderator);
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let token = AuthConfig::new("secret", Duration::minutes(5))
      .issue(&member(Role::Member))
      .unwrap();
    let other = AuthConfig::new("other", Duration::minutes(5));
    assert!(matches!(other.verify(&token), Err(ApiError::Unauthorized(_))));
  }

  #[test]
  fn expired_tokens_are_rejected() {
    // Past the validator's default 60 second leeway.
    let cfg = AuthConfig::new("secret", Duration::minutes(-5));
    let token = cfg.issue(&member(Role::Member)).unwrap();
    assert!(matches!(cfg.verify(&token), Err(ApiError::Unauthorized(m)) if m == "token expired"));
  }
}
