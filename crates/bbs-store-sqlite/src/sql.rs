//! Compile [`Predicate`]s and [`Sort`]s into SQLite fragments.
//!
//! Every field name is checked against the entity's column list before it
//! is spliced into SQL; operands are always bound as positional parameters.

use bbs_core::{
  entity::Entity,
  query::{Clause, ListQuery, Predicate, Sort, SortOrder},
};
use rusqlite::types::Value as Sql;

use crate::{
  Error, Result,
  encode::encode_operand,
  fold::{FOLD, fold},
};

/// A compiled `WHERE` clause (possibly empty) and its bound parameters.
#[derive(Debug, Default)]
pub struct Filter {
  pub sql:    String,
  pub params: Vec<Sql>,
}

impl Filter {
  fn bind(&mut self, value: Sql) -> String {
    self.params.push(value);
    format!("?{}", self.params.len())
  }

  /// Bind a parameter and return its placeholder; used for trailing
  /// `LIMIT`/`OFFSET` operands.
  pub fn placeholder(&mut self, value: Sql) -> String { self.bind(value) }
}

fn column<E: Entity>(field: &str) -> Result<&'static str> {
  E::column(field)
    .map(|c| c.name)
    .ok_or_else(|| Error::UnknownColumn { table: E::TABLE, column: field.to_owned() })
}

/// Escape `%`, `_` and the escape character itself for a `LIKE` pattern.
fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

fn compile_clause(col: &str, clause: &Clause, filter: &mut Filter) -> String {
  match clause {
    Clause::Eq(v) => {
      let p = filter.bind(encode_operand(v));
      format!("{col} = {p}")
    }
    Clause::EqIgnoreCase(s) => {
      let p = filter.bind(Sql::Text(fold(s)));
      format!("{FOLD}({col}) = {p}")
    }
    Clause::Contains(s) => {
      let p = filter.bind(Sql::Text(like_pattern(&fold(s))));
      format!("{FOLD}({col}) LIKE {p} ESCAPE '\\'")
    }
    Clause::Range { gte, lte } => {
      let mut parts = Vec::with_capacity(2);
      if let Some(v) = gte {
        let p = filter.bind(encode_operand(v));
        parts.push(format!("{col} >= {p}"));
      }
      if let Some(v) = lte {
        let p = filter.bind(encode_operand(v));
        parts.push(format!("{col} <= {p}"));
      }
      format!("({})", parts.join(" AND "))
    }
    Clause::Includes(v) => {
      let p = filter.bind(encode_operand(v));
      format!("EXISTS (SELECT 1 FROM json_each({col}) WHERE json_each.value = {p})")
    }
    Clause::IsNull => format!("{col} IS NULL"),
    Clause::NotNull => format!("{col} IS NOT NULL"),
    Clause::NullOr(inner) => {
      let inner = compile_clause(col, inner, filter);
      format!("({col} IS NULL OR {inner})")
    }
  }
}

/// Compile `predicate` into `WHERE …` (or an empty string when it has no
/// conditions).
pub fn compile_filter<E: Entity>(predicate: &Predicate) -> Result<Filter> {
  let mut filter = Filter::default();
  let mut conds = Vec::with_capacity(predicate.conditions().len());
  for cond in predicate.conditions() {
    let col = column::<E>(cond.field)?;
    conds.push(compile_clause(col, &cond.clause, &mut filter));
  }
  if !conds.is_empty() {
    filter.sql = format!("WHERE {}", conds.join(" AND "));
  }
  Ok(filter)
}

/// `ORDER BY` with the primary key as tie-breaker, so that pages never
/// overlap when the sort column has duplicates.
pub fn compile_order<E: Entity>(sort: &Sort) -> Result<String> {
  let col = column::<E>(sort.field)?;
  let dir = match sort.order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  };
  Ok(format!("ORDER BY {col} {dir}, {} {dir}", E::id_column()))
}

pub fn column_list<E: Entity>() -> String {
  E::COLUMNS.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

/// The page query and the count query for one search, sharing a filter.
pub struct SearchSql {
  pub select:        String,
  pub select_params: Vec<Sql>,
  pub count:         String,
  pub count_params:  Vec<Sql>,
}

pub fn compile_search<E: Entity>(query: &ListQuery) -> Result<SearchSql> {
  let filter = compile_filter::<E>(&query.predicate)?;
  let order = compile_order::<E>(&query.sort)?;

  let count = format!("SELECT COUNT(*) FROM {} {}", E::TABLE, filter.sql);
  let count_params = filter.params.clone();

  let mut paged = filter;
  let limit = paged.placeholder(Sql::Integer(i64::from(query.page.limit)));
  let offset = paged.placeholder(Sql::Integer(query.page.skip() as i64));
  let select = format!(
    "SELECT {} FROM {} {} {order} LIMIT {limit} OFFSET {offset}",
    column_list::<E>(),
    E::TABLE,
    paged.sql,
  );

  Ok(SearchSql { select, select_params: paged.params, count, count_params })
}

#[cfg(test)]
mod tests {
  use bbs_core::{
    board::Topic,
    query::{Page, Predicate},
  };
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  #[test]
  fn empty_predicate_has_no_where() {
    let f = compile_filter::<Topic>(&Predicate::new()).unwrap();
    assert!(f.sql.is_empty());
    assert!(f.params.is_empty());
  }

  #[test]
  fn clauses_bind_in_order() {
    let author = Uuid::new_v4();
    let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let p = Predicate::new()
      .eq("author_id", Some(author))
      .contains("title", Some("50%_OFF"))
      .range("created_at", Some(from), None)
      .is_null("deleted_at");

    let f = compile_filter::<Topic>(&p).unwrap();
    assert_eq!(
      f.sql,
      "WHERE author_id = ?1 AND fold(title) LIKE ?2 ESCAPE '\\' \
       AND (created_at >= ?3) AND deleted_at IS NULL"
    );
    assert_eq!(f.params, vec![
      Sql::Text(author.to_string()),
      Sql::Text("%50\\%\\_off%".into()),
      Sql::Text("2024-01-01T00:00:00.000000Z".into()),
    ]);
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let p = Predicate::new().is_null("password_hash");
    assert!(matches!(
      compile_filter::<Topic>(&p),
      Err(Error::UnknownColumn { .. })
    ));
  }

  #[test]
  fn search_appends_limit_and_offset() {
    let query = ListQuery {
      predicate: Predicate::new().is_null("deleted_at"),
      sort:      Sort::asc("title"),
      page:      Page { page: 3, limit: 10 },
    };
    let s = compile_search::<Topic>(&query).unwrap();
    assert!(s.select.ends_with("ORDER BY title ASC, topic_id ASC LIMIT ?1 OFFSET ?2"));
    assert_eq!(s.select_params, vec![Sql::Integer(10), Sql::Integer(20)]);
    assert_eq!(s.count, "SELECT COUNT(*) FROM topics WHERE deleted_at IS NULL");
    assert!(s.count_params.is_empty());
  }
}
