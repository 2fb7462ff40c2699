//! Categories, topics and replies: the content tree of the board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  entity::{Column, ColumnType as Ty, Entity, col},
  validate,
};

pub const MAX_TITLE: usize = 200;
pub const MAX_BODY: usize = 20_000;

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  /// Unique, compared case-insensitively.
  pub name:        String,
  pub description: Option<String>,
  /// Inactive categories are hidden from members and accept no new topics.
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

impl Entity for Category {
  const KIND: &'static str = "category";
  const TABLE: &'static str = "categories";
  const COLUMNS: &'static [Column] = &[
    col("category_id", Ty::Uuid),
    col("name", Ty::Text),
    col("description", Ty::Text),
    col("is_active", Ty::Boolean),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
    col("deleted_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.category_id }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

impl NewCategory {
  pub(crate) fn validate(&self) -> Result<(String, Option<String>)> {
    Ok((
      validate::text("name", &self.name, 80)?,
      validate::optional_text("description", self.description.as_deref(), 1000)?,
    ))
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub is_active:   Option<bool>,
}

// ─── Topic ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
  #[default]
  Open,
  /// Only moderators and administrators may reply.
  Locked,
  Pinned,
}

impl TopicStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Locked => "locked",
      Self::Pinned => "pinned",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
  pub topic_id:    Uuid,
  pub category_id: Uuid,
  pub author_id:   Uuid,
  pub title:       String,
  pub body:        String,
  pub status:      TopicStatus,
  /// Normalised tag names.
  pub tags:        Vec<String>,
  /// Replies that are not soft-deleted.
  pub reply_count: i64,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

impl Entity for Topic {
  const KIND: &'static str = "topic";
  const TABLE: &'static str = "topics";
  const COLUMNS: &'static [Column] = &[
    col("topic_id", Ty::Uuid),
    col("category_id", Ty::Uuid),
    col("author_id", Ty::Uuid),
    col("title", Ty::Text),
    col("body", Ty::Text),
    col("status", Ty::Text),
    col("tags", Ty::Json),
    col("reply_count", Ty::Integer),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
    col("deleted_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.topic_id }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
  pub category_id: Uuid,
  pub title:       String,
  pub body:        String,
  #[serde(default)]
  pub tags:        Vec<String>,
}

impl NewTopic {
  pub(crate) fn validate(&self) -> Result<(String, String)> {
    Ok((
      validate::text("title", &self.title, MAX_TITLE)?,
      validate::text("body", &self.body, MAX_BODY)?,
    ))
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicPatch {
  pub title:  Option<String>,
  pub body:   Option<String>,
  pub tags:   Option<Vec<String>>,
  /// Moderators and administrators only.
  pub status: Option<TopicStatus>,
}

// ─── Reply ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
  pub reply_id:   Uuid,
  pub topic_id:   Uuid,
  pub author_id:  Uuid,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Reply {
  const KIND: &'static str = "reply";
  const TABLE: &'static str = "replies";
  const COLUMNS: &'static [Column] = &[
    col("reply_id", Ty::Uuid),
    col("topic_id", Ty::Uuid),
    col("author_id", Ty::Uuid),
    col("body", Ty::Text),
    col("created_at", Ty::Timestamp),
    col("updated_at", Ty::Timestamp),
    col("deleted_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.reply_id }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReply {
  pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyPatch {
  pub body: Option<String>,
}
