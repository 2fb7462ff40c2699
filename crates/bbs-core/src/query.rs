//! Paginated filter queries.
//!
//! A search request is a record of optional filters. [`Predicate`] builders
//! take those options directly and add a condition only when a value is
//! present, so an unset filter can never turn into an accidental match
//! against `NULL`. Together with a resolved [`Sort`] and [`Page`] the
//! predicate forms a [`ListQuery`], which a store answers with a
//! [`Paginated`] envelope built from one page query and one count query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Page size used when a request does not name one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a request may ask for.
pub const MAX_LIMIT: u32 = 100;

// ─── Values ──────────────────────────────────────────────────────────────────

/// A scalar operand in a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Text(String),
  Int(i64),
  Bool(bool),
  Uuid(Uuid),
  Timestamp(DateTime<Utc>),
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Int(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<Uuid> for Value {
  fn from(v: Uuid) -> Self { Self::Uuid(v) }
}

impl From<DateTime<Utc>> for Value {
  fn from(v: DateTime<Utc>) -> Self { Self::Timestamp(v) }
}

// ─── Conditions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
  Eq(Value),
  /// Equality under Unicode case folding.
  EqIgnoreCase(String),
  /// Case-insensitive substring match.
  Contains(String),
  /// Inclusive range; at least one bound is always set.
  Range {
    gte: Option<Value>,
    lte: Option<Value>,
  },
  /// The column holds a JSON array with an element equal to the value.
  Includes(Value),
  IsNull,
  NotNull,
  /// The column is `NULL` or satisfies the inner clause.
  NullOr(Box<Clause>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
  pub field:  &'static str,
  pub clause: Clause,
}

/// A conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
  conditions: Vec<Condition>,
}

impl Predicate {
  pub fn new() -> Self { Self::default() }

  pub fn conditions(&self) -> &[Condition] { &self.conditions }

  pub fn is_empty(&self) -> bool { self.conditions.is_empty() }

  fn push(mut self, field: &'static str, clause: Clause) -> Self {
    self.conditions.push(Condition { field, clause });
    self
  }

  pub fn eq<V: Into<Value>>(self, field: &'static str, value: Option<V>) -> Self {
    match value {
      Some(v) => self.push(field, Clause::Eq(v.into())),
      None => self,
    }
  }

  pub fn eq_ignore_case(
    self,
    field: &'static str,
    value: Option<impl Into<String>>,
  ) -> Self {
    match value {
      Some(v) => self.push(field, Clause::EqIgnoreCase(v.into())),
      None => self,
    }
  }

  /// Substring filter; blank needles are treated as absent.
  pub fn contains(self, field: &'static str, needle: Option<&str>) -> Self {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
      Some(n) => self.push(field, Clause::Contains(n.to_owned())),
      None => self,
    }
  }

  pub fn range<V: Into<Value>>(
    self,
    field: &'static str,
    gte: Option<V>,
    lte: Option<V>,
  ) -> Self {
    if gte.is_none() && lte.is_none() {
      return self;
    }
    self.push(field, Clause::Range {
      gte: gte.map(Into::into),
      lte: lte.map(Into::into),
    })
  }

  pub fn includes<V: Into<Value>>(
    self,
    field: &'static str,
    element: Option<V>,
  ) -> Self {
    match element {
      Some(v) => self.push(field, Clause::Includes(v.into())),
      None => self,
    }
  }

  pub fn is_null(self, field: &'static str) -> Self {
    self.push(field, Clause::IsNull)
  }

  pub fn not_null(self, field: &'static str) -> Self {
    self.push(field, Clause::NotNull)
  }

  /// `field IS NULL OR field >= gte`.
  pub fn null_or_gte<V: Into<Value>>(self, field: &'static str, gte: V) -> Self {
    self.push(
      field,
      Clause::NullOr(Box::new(Clause::Range { gte: Some(gte.into()), lte: None })),
    )
  }

  /// Apply `f` only when `cond` holds.
  pub fn when(self, cond: bool, f: impl FnOnce(Self) -> Self) -> Self {
    if cond { f(self) } else { self }
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
  pub field: &'static str,
  pub order: SortOrder,
}

impl Sort {
  pub const fn desc(field: &'static str) -> Self {
    Self { field, order: SortOrder::Desc }
  }

  pub const fn asc(field: &'static str) -> Self {
    Self { field, order: SortOrder::Asc }
  }

  /// The default ordering for every listing: newest first.
  pub const fn newest() -> Self { Self::desc("created_at") }

  /// Pick `sort_by` if it is on the allow-list, otherwise fall back to
  /// `default` (field and order both).
  pub fn resolve(
    sort_by: Option<&str>,
    order: Option<SortOrder>,
    allowed: &[&'static str],
    default: Sort,
  ) -> Sort {
    match sort_by.and_then(|s| allowed.iter().copied().find(|a| *a == s)) {
      Some(field) => Sort { field, order: order.unwrap_or_default() },
      None => default,
    }
  }
}

// ─── Pages ───────────────────────────────────────────────────────────────────

/// Raw page parameters as they arrive in a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  pub page:  Option<u32>,
  pub limit: Option<u32>,
}

impl PageRequest {
  pub fn resolve(self) -> Result<Page> {
    let page = self.page.unwrap_or(1);
    let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 {
      return Err(Error::validation("page must be at least 1"));
    }
    if limit == 0 || limit > MAX_LIMIT {
      return Err(Error::validation(format!(
        "limit must be between 1 and {MAX_LIMIT}"
      )));
    }
    Ok(Page { page, limit })
  }
}

/// A validated page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub page:  u32,
  pub limit: u32,
}

impl Page {
  pub fn skip(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

impl Default for Page {
  fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub current: u32,
  pub limit:   u32,
  /// Total rows matching the predicate, across all pages.
  pub records: u64,
  pub pages:   u64,
}

impl Pagination {
  pub fn new(page: Page, records: u64) -> Self {
    Self {
      current: page.page,
      limit: page.limit,
      records,
      pages: records.div_ceil(u64::from(page.limit)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub pagination: Pagination,
  pub data:       Vec<T>,
}

impl<T> Paginated<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
    Paginated {
      pagination: self.pagination,
      data:       self.data.into_iter().map(f).collect(),
    }
  }
}

// ─── ListQuery ───────────────────────────────────────────────────────────────

/// Everything a store needs to answer one paginated search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub predicate: Predicate,
  pub sort:      Sort,
  pub page:      Page,
}

impl ListQuery {
  pub fn new(predicate: Predicate) -> Self {
    Self { predicate, sort: Sort::newest(), page: Page::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_filters_add_nothing() {
    let p = Predicate::new()
      .eq::<Uuid>("author_id", None)
      .contains("title", None)
      .contains("title", Some("   "))
      .range::<DateTime<Utc>>("created_at", None, None)
      .includes::<String>("tags", None)
      .eq_ignore_case("name", None::<String>);
    assert!(p.is_empty());
  }

  #[test]
  fn present_filters_map_to_one_clause_each() {
    let id = Uuid::new_v4();
    let p = Predicate::new()
      .eq("author_id", Some(id))
      .contains("title", Some(" rust "))
      .range("reply_count", Some(3_i64), None);

    assert_eq!(p.conditions(), &[
      Condition { field: "author_id", clause: Clause::Eq(Value::Uuid(id)) },
      Condition { field: "title", clause: Clause::Contains("rust".into()) },
      Condition {
        field:  "reply_count",
        clause: Clause::Range { gte: Some(Value::Int(3)), lte: None },
      },
    ]);
  }

  #[test]
  fn when_applies_conditionally() {
    let p = Predicate::new().when(false, |p| p.is_null("deleted_at"));
    assert!(p.is_empty());
    let p = Predicate::new().when(true, |p| p.is_null("deleted_at"));
    assert_eq!(p.conditions().len(), 1);
  }

  #[test]
  fn page_defaults() {
    let page = PageRequest::default().resolve().unwrap();
    assert_eq!(page, Page { page: 1, limit: DEFAULT_LIMIT });
    assert_eq!(page.skip(), 0);
  }

  #[test]
  fn skip_is_previous_pages_times_limit() {
    let page = PageRequest { page: Some(3), limit: Some(15) }.resolve().unwrap();
    assert_eq!(page.skip(), 30);
  }

  #[test]
  fn invalid_pages_are_rejected() {
    for req in [
      PageRequest { page: Some(0), limit: None },
      PageRequest { page: None, limit: Some(0) },
      PageRequest { page: None, limit: Some(MAX_LIMIT + 1) },
    ] {
      assert!(matches!(req.resolve(), Err(Error::Validation(_))), "{req:?}");
    }
  }

  #[test]
  fn pages_is_ceiling_of_records_over_limit() {
    let page = Page { page: 1, limit: 20 };
    assert_eq!(Pagination::new(page, 0).pages, 0);
    assert_eq!(Pagination::new(page, 1).pages, 1);
    assert_eq!(Pagination::new(page, 20).pages, 1);
    assert_eq!(Pagination::new(page, 21).pages, 2);
    assert_eq!(Pagination::new(page, 400).pages, 20);
  }

  #[test]
  fn sort_falls_back_for_unknown_fields() {
    let allowed = ["created_at", "title"];
    let s = Sort::resolve(Some("password_hash"), Some(SortOrder::Asc), &allowed, Sort::newest());
    assert_eq!(s, Sort::newest());

    let s = Sort::resolve(None, Some(SortOrder::Asc), &allowed, Sort::newest());
    assert_eq!(s, Sort::newest());

    let s = Sort::resolve(Some("title"), None, &allowed, Sort::newest());
    assert_eq!(s, Sort::desc("title"));

    let s = Sort::resolve(Some("title"), Some(SortOrder::Asc), &allowed, Sort::newest());
    assert_eq!(s, Sort::asc("title"));
  }

  #[test]
  fn envelope_serialises_in_wire_shape() {
    let env = Paginated {
      pagination: Pagination::new(Page { page: 2, limit: 10 }, 11),
      data:       vec![1, 2],
    };
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "pagination": { "current": 2, "limit": 10, "records": 11, "pages": 2 },
        "data": [1, 2],
      })
    );
  }
}
