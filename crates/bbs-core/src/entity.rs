//! The `Entity` trait: the table mapping every persisted row type carries.
//!
//! Entities are plain serde structs. The column list tells a backend which
//! top-level JSON fields become columns and how each is stored, so a single
//! generic codec can persist any of them.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Text,
  Integer,
  Boolean,
  Uuid,
  /// UTC instant; backends must store it so that lexical order is time order.
  Timestamp,
  /// Arbitrary JSON (arrays, nested objects) stored as compact text.
  Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub ty:   ColumnType,
}

pub const fn col(name: &'static str, ty: ColumnType) -> Column {
  Column { name, ty }
}

/// A row type persisted by a [`BoardStore`](crate::store::BoardStore).
///
/// `COLUMNS` must name every serialised field of the struct, the id column
/// first.
pub trait Entity:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  /// Human-readable noun used in error messages (`"topic"`).
  const KIND: &'static str;
  const TABLE: &'static str;
  const COLUMNS: &'static [Column];

  fn id(&self) -> Uuid;

  /// Name of the primary-key column.
  fn id_column() -> &'static str { Self::COLUMNS[0].name }

  fn column(name: &str) -> Option<&'static Column> {
    Self::COLUMNS.iter().find(|c| c.name == name)
  }
}

/// The current instant truncated to microseconds, the precision every
/// backend is expected to round-trip.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }
