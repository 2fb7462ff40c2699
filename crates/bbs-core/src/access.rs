//! Who is asking, and what they may see.
//!
//! Soft-deleted rows stay readable by moderators and administrators and are
//! hidden from everyone else.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result, member::Role};

/// An authenticated caller. The role is whatever the source claims: a
/// bearer token, or the member row when re-read for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
  pub member_id: Uuid,
  pub role:      Role,
}

impl Actor {
  /// Authors may edit their own content; elevated roles may edit anything.
  pub fn can_edit(&self, author_id: Uuid) -> bool {
    self.member_id == author_id || self.role.is_elevated()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
  #[default]
  Guest,
  Member(Actor),
}

impl Viewer {
  pub fn member(member_id: Uuid, role: Role) -> Self {
    Self::Member(Actor { member_id, role })
  }

  pub fn role(&self) -> Option<Role> {
    match self {
      Self::Guest => None,
      Self::Member(a) => Some(a.role),
    }
  }

  pub fn member_id(&self) -> Option<Uuid> {
    match self {
      Self::Guest => None,
      Self::Member(a) => Some(a.member_id),
    }
  }

  /// The authenticated actor, or [`Error::Unauthorized`] for guests.
  pub fn actor(&self) -> Result<Actor> {
    match self {
      Self::Guest => Err(Error::Unauthorized),
      Self::Member(a) => Ok(*a),
    }
  }

  /// Require at least `min` privilege.
  pub fn require_role(&self, min: Role) -> Result<Actor> {
    let actor = self.actor()?;
    if actor.role < min {
      return Err(Error::forbidden(format!("requires {} role", min.as_str())));
    }
    Ok(actor)
  }

  pub fn is_elevated(&self) -> bool {
    self.role().is_some_and(Role::is_elevated)
  }

  pub fn can_see_deleted(&self) -> bool { self.is_elevated() }

  /// Whether a row with the given `deleted_at` is visible to this viewer.
  pub fn sees(&self, deleted_at: Option<DateTime<Utc>>) -> bool {
    deleted_at.is_none() || self.can_see_deleted()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn guests_see_only_live_rows() {
    let now = Utc::now();
    assert!(Viewer::Guest.sees(None));
    assert!(!Viewer::Guest.sees(Some(now)));
    assert!(!Viewer::member(Uuid::new_v4(), Role::Member).sees(Some(now)));
    assert!(Viewer::member(Uuid::new_v4(), Role::Moderator).sees(Some(now)));
  }

  #[test]
  fn authors_and_elevated_can_edit() {
    let author = Uuid::new_v4();
    let actor = |member_id, role| Actor { member_id, role };
    assert!(actor(author, Role::Member).can_edit(author));
    assert!(!actor(Uuid::new_v4(), Role::Member).can_edit(author));
    assert!(actor(Uuid::new_v4(), Role::Administrator).can_edit(author));
  }

  #[test]
  fn require_role() {
    assert!(matches!(
      Viewer::Guest.require_role(Role::Member),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      Viewer::member(Uuid::new_v4(), Role::Member).require_role(Role::Moderator),
      Err(Error::Forbidden(_))
    ));
    assert!(
      Viewer::member(Uuid::new_v4(), Role::Administrator)
        .require_role(Role::Moderator)
        .is_ok()
    );
  }
}
