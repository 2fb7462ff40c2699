//! Encoding and decoding between entity JSON and SQLite column values.
//!
//! An entity is serialised with serde, and each top-level field named in its
//! `COLUMNS` list is converted according to the column's [`ColumnType`]:
//!
//! - UUIDs are stored as hyphenated lowercase strings.
//! - Timestamps are stored as RFC 3339 with exactly six fractional digits
//!   and a `Z` suffix, so that string comparison orders them correctly.
//! - Booleans are stored as `0`/`1`.
//! - JSON columns hold compact JSON text.

use bbs_core::{
  entity::{Column, ColumnType, Entity},
  query::Value,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value as Sql;
use serde_json::Value as Json;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A query operand, encoded the same way as the column it is compared with.
pub fn encode_operand(v: &Value) -> Sql {
  match v {
    Value::Text(s) => Sql::Text(s.clone()),
    Value::Int(i) => Sql::Integer(*i),
    Value::Bool(b) => Sql::Integer(i64::from(*b)),
    Value::Uuid(id) => Sql::Text(encode_uuid(*id)),
    Value::Timestamp(dt) => Sql::Text(encode_dt(*dt)),
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

fn encode_column(column: &Column, value: &Json) -> Result<Sql> {
  if value.is_null() {
    return Ok(Sql::Null);
  }
  let mismatch = |expected: &str| Error::Encode {
    column: column.name,
    reason: format!("expected {expected}, got {value}"),
  };

  Ok(match column.ty {
    ColumnType::Text => Sql::Text(value.as_str().ok_or_else(|| mismatch("string"))?.to_owned()),
    ColumnType::Uuid => {
      let s = value.as_str().ok_or_else(|| mismatch("uuid string"))?;
      Sql::Text(encode_uuid(Uuid::parse_str(s)?))
    }
    ColumnType::Timestamp => {
      let s = value.as_str().ok_or_else(|| mismatch("timestamp string"))?;
      Sql::Text(encode_dt(decode_dt(s)?))
    }
    ColumnType::Integer => Sql::Integer(value.as_i64().ok_or_else(|| mismatch("integer"))?),
    ColumnType::Boolean => {
      Sql::Integer(i64::from(value.as_bool().ok_or_else(|| mismatch("boolean"))?))
    }
    ColumnType::Json => Sql::Text(value.to_string()),
  })
}

fn decode_column(column: &Column, value: Sql) -> Result<Json> {
  let decode_err = |reason: String| Error::Decode { column: column.name, reason };

  Ok(match (column.ty, value) {
    (_, Sql::Null) => Json::Null,
    (ColumnType::Text | ColumnType::Uuid | ColumnType::Timestamp, Sql::Text(s)) => {
      Json::String(s)
    }
    (ColumnType::Integer, Sql::Integer(i)) => Json::from(i),
    (ColumnType::Boolean, Sql::Integer(i)) => Json::Bool(i != 0),
    (ColumnType::Json, Sql::Text(s)) => {
      serde_json::from_str(&s).map_err(|e| decode_err(e.to_string()))?
    }
    (ty, other) => {
      return Err(decode_err(format!("{ty:?} column holds {other:?}")));
    }
  })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column values of `entity`, in `E::COLUMNS` order.
pub fn encode_row<E: Entity>(entity: &E) -> Result<Vec<Sql>> {
  let json = serde_json::to_value(entity)?;
  let fields = json.as_object().ok_or_else(|| Error::Encode {
    column: E::TABLE,
    reason: "entity does not serialise to an object".into(),
  })?;
  E::COLUMNS
    .iter()
    .map(|c| encode_column(c, fields.get(c.name).unwrap_or(&Json::Null)))
    .collect()
}

/// Rebuild an entity from raw values read in `E::COLUMNS` order.
pub fn decode_row<E: Entity>(values: Vec<Sql>) -> Result<E> {
  let mut fields = serde_json::Map::with_capacity(values.len());
  for (column, value) in E::COLUMNS.iter().zip(values) {
    fields.insert(column.name.to_owned(), decode_column(column, value)?);
  }
  Ok(serde_json::from_value(Json::Object(fields))?)
}

#[cfg(test)]
mod tests {
  use bbs_core::{
    board::{Topic, TopicStatus},
    entity::now,
  };

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = decode_dt("2024-05-01T10:00:00.1Z").unwrap();
    let b = decode_dt("2024-05-01T10:00:00.12Z").unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(a), "2024-05-01T10:00:00.100000Z");
  }

  #[test]
  fn topic_row_roundtrip() {
    let at = now();
    let topic = Topic {
      topic_id:    Uuid::new_v4(),
      category_id: Uuid::new_v4(),
      author_id:   Uuid::new_v4(),
      title:       "Hello".into(),
      body:        "World".into(),
      status:      TopicStatus::Pinned,
      tags:        vec!["rust".into(), "async".into()],
      reply_count: 3,
      created_at:  at,
      updated_at:  at,
      deleted_at:  None,
    };

    let row = encode_row(&topic).unwrap();
    assert_eq!(row.len(), Topic::COLUMNS.len());
    assert_eq!(row[5], Sql::Text("pinned".into()));
    assert_eq!(row[6], Sql::Text(r#"["rust","async"]"#.into()));
    assert_eq!(row[10], Sql::Null);

    let back: Topic = decode_row(row).unwrap();
    assert_eq!(back, topic);
  }

  #[test]
  fn operands_match_column_encoding() {
    assert_eq!(encode_operand(&Value::Bool(true)), Sql::Integer(1));
    let id = Uuid::new_v4();
    assert_eq!(encode_operand(&Value::Uuid(id)), Sql::Text(id.to_string()));
  }
}
