//! Topic tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  entity::{Column, ColumnType as Ty, Entity, col},
};

pub const MAX_TAG_LEN: usize = 32;
pub const MAX_TAGS_PER_TOPIC: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id:     Uuid,
  /// Always the output of [`normalize_tag`].
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

impl Entity for Tag {
  const KIND: &'static str = "tag";
  const TABLE: &'static str = "tags";
  const COLUMNS: &'static [Column] = &[
    col("tag_id", Ty::Uuid),
    col("name", Ty::Text),
    col("created_at", Ty::Timestamp),
  ];

  fn id(&self) -> Uuid { self.tag_id }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
  pub name: String,
}

/// Trim, lowercase, and join inner whitespace with `-`.
///
/// The result is non-empty, at most [`MAX_TAG_LEN`] chars, and contains only
/// alphanumerics, `-` and `_`.
pub fn normalize_tag(raw: &str) -> Result<String> {
  let name = raw
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("-")
    .to_lowercase();

  if name.is_empty() {
    return Err(Error::validation("tag name must not be empty"));
  }
  if name.chars().count() > MAX_TAG_LEN {
    return Err(Error::validation(format!(
      "tag name must be at most {MAX_TAG_LEN} characters"
    )));
  }
  if !name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
    return Err(Error::validation(format!("invalid tag name: {raw:?}")));
  }
  Ok(name)
}

/// Normalise a topic's tag list, dropping duplicates but keeping first-seen
/// order.
pub fn normalize_tags(raw: &[String]) -> Result<Vec<String>> {
  let mut out: Vec<String> = Vec::with_capacity(raw.len());
  for r in raw {
    let name = normalize_tag(r)?;
    if !out.contains(&name) {
      out.push(name);
    }
  }
  if out.len() > MAX_TAGS_PER_TOPIC {
    return Err(Error::validation(format!(
      "a topic may carry at most {MAX_TAGS_PER_TOPIC} tags"
    )));
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalises_case_and_whitespace() {
    assert_eq!(normalize_tag("  Rust ").unwrap(), "rust");
    assert_eq!(normalize_tag("Async  Await").unwrap(), "async-await");
    assert_eq!(normalize_tag("FOO").unwrap(), normalize_tag("foo").unwrap());
  }

  #[test]
  fn rejects_bad_names() {
    assert!(normalize_tag("   ").is_err());
    assert!(normalize_tag("c++").is_err());
    assert!(normalize_tag(&"x".repeat(MAX_TAG_LEN + 1)).is_err());
  }

  #[test]
  fn dedups_after_normalising() {
    let tags = normalize_tags(&["Rust".into(), "rust".into(), "tokio".into()])
      .unwrap();
    assert_eq!(tags, vec!["rust".to_owned(), "tokio".to_owned()]);
  }
}
