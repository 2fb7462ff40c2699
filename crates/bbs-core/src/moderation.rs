//! Reports, moderation actions and suspensions.
//!
//! Members file [`Report`]s against topics or replies. Moderators answer
//! them with a [`ModerationAction`], which is recorded whether or not it was
//! prompted by a report. [`Suspension`]s bar a member from posting until
//! they expire or are lifted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Column, ColumnType as Ty, Entity, col};

// ─── Targets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
  Topic,
  Reply,
}

impl TargetKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Topic => "topic",
      Self::Reply => "reply",
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
  #[default]
  Pending,
  Resolved,
  Dismissed,
}

impl ReportStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Resolved => "resolved",
      Self::Dismissed => "dismissed",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
  pub report_id:   Uuid,
  pub reporter_id: Uuid,
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
  pub reason:      String,
  pub status:      ReportStatus,
  /// Moderator who resolved or dismissed the report.
  pub resolved_by: Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Entity for Report {
  const KIND: &'static str = "report";
  const TABLE: &'static str = "reports";
  const COLUMNS: &'static [Column] = &[
    col("report_id", Ty::Uuid),
    col("reporter_id", Ty::Uuid),
    col("target_kind", Ty::Text),
    col("target_id", Ty::Uuid),
    col("reason", Ty::Text),
    col("status", Ty::Text),
    col("resolved_by", Ty::Uuid),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.report_id }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
  pub reason:      String,
}

// ─── Moderation action ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
  /// Soft-delete the target.
  Hide,
  /// Undo a soft delete.
  Restore,
  /// Topics only.
  Lock,
  /// Topics only.
  Unlock,
  /// Close a report without touching its target.
  Dismiss,
}

impl ActionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hide => "hide",
      Self::Restore => "restore",
      Self::Lock => "lock",
      Self::Unlock => "unlock",
      Self::Dismiss => "dismiss",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationAction {
  pub action_id:    Uuid,
  pub moderator_id: Uuid,
  pub report_id:    Option<Uuid>,
  pub kind:         ActionKind,
  pub target_kind:  TargetKind,
  pub target_id:    Uuid,
  pub note:         Option<String>,
  pub created_at:   DateTime<Utc>,
}

impl Entity for ModerationAction {
  const KIND: &'static str = "moderation action";
  const TABLE: &'static str = "moderation_actions";
  const COLUMNS: &'static [Column] = &[
    col("action_id", Ty::Uuid),
    col("moderator_id", Ty::Uuid),
    col("report_id", Ty::Uuid),
    col("kind", Ty::Text),
    col("target_kind", Ty::Text),
    col("target_id", Ty::Uuid),
    col("note", Ty::Text),
    col("created_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.action_id }
}

/// Input to [`crate::forum::Forum::moderate`].
///
/// The target is taken from the report when `report_id` is set; explicit
/// target fields must then agree with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAction {
  pub kind:        ActionKind,
  #[serde(default)]
  pub report_id:   Option<Uuid>,
  #[serde(default)]
  pub target_kind: Option<TargetKind>,
  #[serde(default)]
  pub target_id:   Option<Uuid>,
  #[serde(default)]
  pub note:        Option<String>,
}

// ─── Suspension ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
  pub suspension_id: Uuid,
  pub member_id:     Uuid,
  pub moderator_id:  Uuid,
  pub reason:        String,
  /// `None` means indefinite.
  pub ends_at:       Option<DateTime<Utc>>,
  pub lifted_at:     Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Entity for Suspension {
  const KIND: &'static str = "suspension";
  const TABLE: &'static str = "suspensions";
  const COLUMNS: &'static [Column] = &[
    col("suspension_id", Ty::Uuid),
    col("member_id", Ty::Uuid),
    col("moderator_id", Ty::Uuid),
    col("reason", Ty::Text),
    col("ends_at", Ty::Timestamp),
    col("lifted_at", Ty::Timestamp),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.suspension_id }
}

impl Suspension {
  /// Not lifted and not yet expired at `at`.
  pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
    self.lifted_at.is_none() && self.ends_at.is_none_or(|end| end > at)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSuspension {
  pub member_id: Uuid,
  pub reason:    String,
  #[serde(default)]
  pub ends_at:   Option<DateTime<Utc>>,
}

/// Filter over the derived state of a suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuspensionState {
  Active,
  Expired,
  Lifted,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn suspension(ends_at: Option<DateTime<Utc>>) -> Suspension {
    let now = Utc::now();
    Suspension {
      suspension_id: Uuid::new_v4(),
      member_id: Uuid::new_v4(),
      moderator_id: Uuid::new_v4(),
      reason: "spam".into(),
      ends_at,
      lifted_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn suspension_activity() {
    let now = Utc::now();
    assert!(suspension(None).is_active_at(now));
    assert!(suspension(Some(now + Duration::hours(1))).is_active_at(now));
    assert!(!suspension(Some(now - Duration::hours(1))).is_active_at(now));

    let mut lifted = suspension(None);
    lifted.lifted_at = Some(now);
    assert!(!lifted.is_active_at(now));
  }
}
