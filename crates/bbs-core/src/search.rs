//! Search request bodies, one per resource.
//!
//! Every field is optional. `to_query` turns a request into a [`ListQuery`]
//! for a particular [`Viewer`], adding the soft-delete gate where the
//! resource has one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  access::Viewer,
  board::TopicStatus,
  entity,
  member::{AccountStatus, Role},
  moderation::{ActionKind, ReportStatus, SuspensionState, TargetKind},
  query::{ListQuery, PageRequest, Predicate, Sort, SortOrder},
};

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Page and sort parameters shared by every search body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paging {
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
  pub sort_by:    Option<String>,
  pub sort_order: Option<SortOrder>,
}

impl Paging {
  pub fn page(page: u32, limit: u32) -> Self {
    Self { page: Some(page), limit: Some(limit), ..Self::default() }
  }

  /// Resolve against an allow-list of sortable columns; anything else sorts
  /// newest first.
  pub fn into_query(
    &self,
    predicate: Predicate,
    sortable: &[&'static str],
  ) -> Result<ListQuery> {
    let page = PageRequest { page: self.page, limit: self.limit }.resolve()?;
    let sort = Sort::resolve(
      self.sort_by.as_deref(),
      self.sort_order,
      sortable,
      Sort::newest(),
    );
    Ok(ListQuery { predicate, sort, page })
  }
}

/// Hide soft-deleted rows unless the viewer may see them *and* asked to.
fn deleted_gate(p: Predicate, viewer: &Viewer, include_deleted: Option<bool>) -> Predicate {
  let include = include_deleted.unwrap_or(false) && viewer.can_see_deleted();
  p.when(!include, |p| p.is_null("deleted_at"))
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSearch {
  pub username:       Option<String>,
  pub email:          Option<String>,
  pub role:           Option<Role>,
  pub account_status: Option<AccountStatus>,
  pub created_from:   Option<DateTime<Utc>>,
  pub created_to:     Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub paging:         Paging,
}

impl MemberSearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "username"];

  pub fn to_query(&self) -> Result<ListQuery> {
    let p = Predicate::new()
      .contains("username", self.username.as_deref())
      .contains("email", self.email.as_deref())
      .eq("role", self.role.map(Role::as_str))
      .eq("account_status", self.account_status.map(AccountStatus::as_str))
      .range("created_at", self.created_from, self.created_to);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySearch {
  pub name:            Option<String>,
  /// Honoured for moderators and administrators only; members always see
  /// active categories.
  pub is_active:       Option<bool>,
  pub include_deleted: Option<bool>,
  #[serde(flatten)]
  pub paging:          Paging,
}

impl CategorySearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "name"];

  pub fn to_query(&self, viewer: &Viewer) -> Result<ListQuery> {
    let is_active = if viewer.is_elevated() { self.is_active } else { Some(true) };
    let p = Predicate::new()
      .contains("name", self.name.as_deref())
      .eq("is_active", is_active);
    let p = deleted_gate(p, viewer, self.include_deleted);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Topics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSearch {
  pub category_id:     Option<Uuid>,
  pub author_id:       Option<Uuid>,
  pub title:           Option<String>,
  pub status:          Option<TopicStatus>,
  /// Exact tag name; normalised before matching.
  pub tag:             Option<String>,
  pub created_from:    Option<DateTime<Utc>>,
  pub created_to:      Option<DateTime<Utc>>,
  pub include_deleted: Option<bool>,
  #[serde(flatten)]
  pub paging:          Paging,
}

impl TopicSearch {
  pub const SORTABLE: &'static [&'static str] =
    &["created_at", "updated_at", "title", "reply_count"];

  pub fn to_query(&self, viewer: &Viewer) -> Result<ListQuery> {
    let tag = self
      .tag
      .as_deref()
      .filter(|t| !t.trim().is_empty())
      .map(crate::tag::normalize_tag)
      .transpose()?;
    let p = Predicate::new()
      .eq("category_id", self.category_id)
      .eq("author_id", self.author_id)
      .contains("title", self.title.as_deref())
      .eq("status", self.status.map(TopicStatus::as_str))
      .includes("tags", tag)
      .range("created_at", self.created_from, self.created_to);
    let p = deleted_gate(p, viewer, self.include_deleted);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Replies ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySearch {
  pub author_id:       Option<Uuid>,
  pub body:            Option<String>,
  pub created_from:    Option<DateTime<Utc>>,
  pub created_to:      Option<DateTime<Utc>>,
  pub include_deleted: Option<bool>,
  #[serde(flatten)]
  pub paging:          Paging,
}

impl ReplySearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "updated_at"];

  /// Replies are always listed within one topic, taken from the URL.
  pub fn to_query(&self, viewer: &Viewer, topic_id: Uuid) -> Result<ListQuery> {
    let p = Predicate::new()
      .eq("topic_id", Some(topic_id))
      .eq("author_id", self.author_id)
      .contains("body", self.body.as_deref())
      .range("created_at", self.created_from, self.created_to);
    let p = deleted_gate(p, viewer, self.include_deleted);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSearch {
  pub name:   Option<String>,
  #[serde(flatten)]
  pub paging: Paging,
}

impl TagSearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "name"];

  pub fn to_query(&self) -> Result<ListQuery> {
    let p = Predicate::new().contains("name", self.name.as_deref());
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSearch {
  pub reporter_id:  Option<Uuid>,
  pub target_kind:  Option<TargetKind>,
  pub target_id:    Option<Uuid>,
  pub status:       Option<ReportStatus>,
  pub created_from: Option<DateTime<Utc>>,
  pub created_to:   Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub paging:       Paging,
}

impl ReportSearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "updated_at"];

  pub fn to_query(&self) -> Result<ListQuery> {
    let p = Predicate::new()
      .eq("reporter_id", self.reporter_id)
      .eq("target_kind", self.target_kind.map(TargetKind::as_str))
      .eq("target_id", self.target_id)
      .eq("status", self.status.map(ReportStatus::as_str))
      .range("created_at", self.created_from, self.created_to);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Moderation actions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSearch {
  pub moderator_id: Option<Uuid>,
  pub report_id:    Option<Uuid>,
  pub kind:         Option<ActionKind>,
  pub target_id:    Option<Uuid>,
  #[serde(flatten)]
  pub paging:       Paging,
}

impl ActionSearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at"];

  pub fn to_query(&self) -> Result<ListQuery> {
    let p = Predicate::new()
      .eq("moderator_id", self.moderator_id)
      .eq("report_id", self.report_id)
      .eq("kind", self.kind.map(ActionKind::as_str))
      .eq("target_id", self.target_id);
    self.paging.into_query(p, Self::SORTABLE)
  }
}

// ─── Suspensions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionSearch {
  pub member_id:    Option<Uuid>,
  pub moderator_id: Option<Uuid>,
  pub state:        Option<SuspensionState>,
  #[serde(flatten)]
  pub paging:       Paging,
}

impl SuspensionSearch {
  pub const SORTABLE: &'static [&'static str] = &["created_at", "ends_at"];

  pub fn to_query(&self) -> Result<ListQuery> {
    let now = entity::now();
    let p = Predicate::new()
      .eq("member_id", self.member_id)
      .eq("moderator_id", self.moderator_id);
    let p = match self.state {
      None => p,
      Some(SuspensionState::Active) => {
        p.is_null("lifted_at").null_or_gte("ends_at", now)
      }
      Some(SuspensionState::Expired) => {
        p.is_null("lifted_at").range("ends_at", None, Some(now))
      }
      Some(SuspensionState::Lifted) => p.not_null("lifted_at"),
    };
    self.paging.into_query(p, Self::SORTABLE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::query::{Clause, Condition, DEFAULT_LIMIT, Value};

  fn member() -> Viewer { Viewer::member(Uuid::new_v4(), Role::Member) }

  fn moderator() -> Viewer { Viewer::member(Uuid::new_v4(), Role::Moderator) }

  #[test]
  fn empty_search_is_first_page_newest_first() {
    let q = TopicSearch::default().to_query(&Viewer::Guest).unwrap();
    assert_eq!(q.page.page, 1);
    assert_eq!(q.page.limit, DEFAULT_LIMIT);
    assert_eq!(q.sort, Sort::newest());
    assert_eq!(q.predicate.conditions(), &[Condition {
      field:  "deleted_at",
      clause: Clause::IsNull,
    }]);
  }

  #[test]
  fn include_deleted_requires_elevation() {
    let search = TopicSearch { include_deleted: Some(true), ..Default::default() };
    assert!(!search.to_query(&member()).unwrap().predicate.is_empty());
    assert!(search.to_query(&moderator()).unwrap().predicate.is_empty());
  }

  #[test]
  fn tag_filter_is_normalised() {
    let search = TopicSearch { tag: Some(" Rust ".into()), ..Default::default() };
    let q = search.to_query(&moderator()).unwrap();
    assert!(q.predicate.conditions().contains(&Condition {
      field:  "tags",
      clause: Clause::Includes(Value::Text("rust".into())),
    }));
  }

  #[test]
  fn members_only_see_active_categories() {
    let search = CategorySearch { is_active: Some(false), ..Default::default() };
    let q = search.to_query(&member()).unwrap();
    assert!(q.predicate.conditions().contains(&Condition {
      field:  "is_active",
      clause: Clause::Eq(Value::Bool(true)),
    }));
  }

  #[test]
  fn report_filters_pass_through() {
    let reporter = Uuid::new_v4();
    let search = ReportSearch {
      reporter_id: Some(reporter),
      status: Some(ReportStatus::Pending),
      ..Default::default()
    };
    let q = search.to_query().unwrap();
    assert_eq!(q.predicate.conditions(), &[
      Condition { field: "reporter_id", clause: Clause::Eq(Value::Uuid(reporter)) },
      Condition { field: "status", clause: Clause::Eq(Value::Text("pending".into())) },
    ]);
  }

  #[test]
  fn unknown_sort_field_falls_back() {
    let search = MemberSearch {
      paging: Paging {
        sort_by: Some("password_hash".into()),
        sort_order: Some(SortOrder::Asc),
        ..Default::default()
      },
      ..Default::default()
    };
    assert_eq!(search.to_query().unwrap().sort, Sort::newest());
  }

  #[test]
  fn paging_flattens_from_json() {
    let search: TopicSearch = serde_json::from_value(serde_json::json!({
      "title": "hello",
      "page": 2,
      "limit": 5,
      "sort_by": "title",
      "sort_order": "asc",
    }))
    .unwrap();
    let q = search.to_query(&Viewer::Guest).unwrap();
    assert_eq!(q.page.skip(), 5);
    assert_eq!(q.sort, Sort::asc("title"));
  }
}
