//! Members, their roles, and stored credentials.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  entity::{Column, ColumnType as Ty, Entity, col},
  validate,
};

// ─── Role ────────────────────────────────────────────────────────────────────

/// Roles are ordered by privilege: `Member < Moderator < Administrator`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Member,
  Moderator,
  Administrator,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Member => "member",
      Self::Moderator => "moderator",
      Self::Administrator => "administrator",
    }
  }

  /// Moderators and administrators.
  pub fn is_elevated(self) -> bool { self >= Self::Moderator }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  #[default]
  Active,
  Suspended,
  Disabled,
}

impl AccountStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Suspended => "suspended",
      Self::Disabled => "disabled",
    }
  }
}

// ─── Member ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub member_id:      Uuid,
  /// Lowercase; unique.
  pub username:       String,
  pub email:          String,
  pub display_name:   Option<String>,
  pub role:           Role,
  pub account_status: AccountStatus,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Entity for Member {
  const KIND: &'static str = "member";
  const TABLE: &'static str = "members";
  const COLUMNS: &'static [Column] = &[
    col("member_id", Ty::Uuid),
    col("username", Ty::Text),
    col("email", Ty::Text),
    col("display_name", Ty::Text),
    col("role", Ty::Text),
    col("account_status", Ty::Text),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.member_id }
}

/// Input to [`crate::forum::Forum::register`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub username:     String,
  pub email:        String,
  pub password:     String,
  #[serde(default)]
  pub display_name: Option<String>,
}

impl Registration {
  pub const MIN_PASSWORD: usize = 8;

  /// Normalised `(username, email, display_name)`.
  pub(crate) fn validate(&self) -> Result<(String, String, Option<String>)> {
    let username = normalize_username(&self.username)?;
    let email = validate::email(&self.email)?;
    if self.password.chars().count() < Self::MIN_PASSWORD {
      return Err(Error::validation(format!(
        "password must be at least {} characters",
        Self::MIN_PASSWORD
      )));
    }
    let display_name =
      validate::optional_text("display_name", self.display_name.as_deref(), 64)?;
    Ok((username, email, display_name))
  }
}

/// Lowercase, 3-32 chars of `[a-z0-9_]`.
pub fn normalize_username(raw: &str) -> Result<String> {
  let name = raw.trim().to_lowercase();
  let len = name.chars().count();
  if !(3..=32).contains(&len) {
    return Err(Error::validation("username must be 3-32 characters"));
  }
  if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    return Err(Error::validation(
      "username may only contain letters, digits and underscores",
    ));
  }
  Ok(name)
}

/// Profile fields a member may change on their own account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPatch {
  pub email:        Option<String>,
  pub display_name: Option<String>,
}

// ─── Credential ──────────────────────────────────────────────────────────────

/// A member's password hash, kept in its own table so that `Member` rows can
/// be returned to clients as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
  pub member_id:     Uuid,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl Entity for Credential {
  const KIND: &'static str = "credential";
  const TABLE: &'static str = "credentials";
  const COLUMNS: &'static [Column] =
    &[col("member_id", Ty::Uuid), col("password_hash", Ty::Text)];

  fn id(&self) -> Uuid { self.member_id }
}

impl Credential {
  pub fn verify(&self, password: &str) -> bool {
    PasswordHash::new(&self.password_hash)
      .map(|parsed| {
        Argon2::default()
          .verify_password(password.as_bytes(), &parsed)
          .is_ok()
      })
      .unwrap_or(false)
  }
}

/// Hash `password` with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roles_are_ordered_by_privilege() {
    assert!(Role::Member < Role::Moderator);
    assert!(Role::Moderator < Role::Administrator);
    assert!(!Role::Member.is_elevated());
    assert!(Role::Moderator.is_elevated());
  }

  #[test]
  fn usernames_are_lowercased() {
    assert_eq!(normalize_username(" Alice_01 ").unwrap(), "alice_01");
    assert!(normalize_username("al").is_err());
    assert!(normalize_username("alice smith").is_err());
  }

  #[test]
  fn password_roundtrip() {
    let cred = Credential {
      member_id:     Uuid::new_v4(),
      password_hash: hash_password("correct horse").unwrap(),
    };
    assert!(cred.verify("correct horse"));
    assert!(!cred.verify("battery staple"));
  }

  #[test]
  fn registration_rejects_short_passwords() {
    let reg = Registration {
      username:     "alice".into(),
      email:        "alice@example.com".into(),
      password:     "short".into(),
      display_name: None,
    };
    assert!(matches!(reg.validate(), Err(Error::Validation(_))));
  }
}
