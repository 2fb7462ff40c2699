//! [`SqliteStore`]: the SQLite implementation of [`BoardStore`].

use std::path::Path;

use bbs_core::{
  entity::Entity,
  query::{ListQuery, Paginated, Pagination, Predicate},
  store::BoardStore,
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value as Sql};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode_row, encode_row, encode_uuid},
  fold,
  schema::SCHEMA,
  sql::{column_list, compile_filter, compile_search},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A board store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, register SQL functions and run
  /// schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        fold::register(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `INSERT`/`UPDATE` SQL, returning the affected row count or the
  /// message of a unique-constraint violation.
  async fn write(&self, sql: String, row: Vec<Sql>) -> Result<Result<usize, String>> {
    let outcome = self
      .conn
      .call(move |conn| match conn.execute(&sql, params_from_iter(row)) {
        Ok(n) => Ok(Ok(n)),
        Err(e) if is_unique_violation(&e) => Ok(Err(e.to_string())),
        Err(e) => Err(e.into()),
      })
      .await?;
    Ok(outcome)
  }

  /// Run a `SELECT` of every column of `E` and return raw rows.
  async fn select_rows<E: Entity>(&self, sql: String, params: Vec<Sql>) -> Result<Vec<Vec<Sql>>> {
    let width = E::COLUMNS.len();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), |row| {
            (0..width).map(|i| row.get::<_, Sql>(i)).collect()
          })?
          .collect::<rusqlite::Result<Vec<Vec<Sql>>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  match e {
    rusqlite::Error::SqliteFailure(f, _) => {
      f.code == rusqlite::ErrorCode::ConstraintViolation
        && (f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
          || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    }
    _ => false,
  }
}

fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = Error;

  async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
    let row = encode_row(&entity)?;
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      E::TABLE,
      column_list::<E>(),
      placeholders(row.len()),
    );
    debug!(table = E::TABLE, id = %entity.id(), "insert");

    match self.write(sql, row).await? {
      Ok(_) => Ok(entity),
      Err(message) => Err(Error::Conflict { kind: E::KIND, message }),
    }
  }

  async fn get<E: Entity>(&self, id: Uuid) -> Result<Option<E>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {} = ?1",
      column_list::<E>(),
      E::TABLE,
      E::id_column(),
    );
    let width = E::COLUMNS.len();
    let id_str = encode_uuid(id);

    let raw: Option<Vec<Sql>> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(&sql, rusqlite::params![id_str], |row| {
            (0..width).map(|i| row.get::<_, Sql>(i)).collect()
          })
          .optional()?;
        Ok(row)
      })
      .await?;

    raw.map(decode_row).transpose()
  }

  async fn update<E: Entity>(&self, entity: E) -> Result<E> {
    let row = encode_row(&entity)?;
    // The id is the first column; bind it last so the SET list can use ?1..
    let mut values = row.into_iter();
    let id = values.next().unwrap_or(Sql::Null);
    let mut params: Vec<Sql> = values.collect();
    params.push(id);

    let assignments = E::COLUMNS[1..]
      .iter()
      .enumerate()
      .map(|(i, c)| format!("{} = ?{}", c.name, i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "UPDATE {} SET {assignments} WHERE {} = ?{}",
      E::TABLE,
      E::id_column(),
      params.len(),
    );
    debug!(table = E::TABLE, id = %entity.id(), "update");

    match self.write(sql, params).await? {
      Ok(0) => Err(Error::NotFound { kind: E::KIND, id: entity.id() }),
      Ok(_) => Ok(entity),
      Err(message) => Err(Error::Conflict { kind: E::KIND, message }),
    }
  }

  async fn find_one<E: Entity>(&self, predicate: Predicate) -> Result<Option<E>> {
    let filter = compile_filter::<E>(&predicate)?;
    let sql = format!(
      "SELECT {} FROM {} {} LIMIT 1",
      column_list::<E>(),
      E::TABLE,
      filter.sql,
    );
    let mut rows = self.select_rows::<E>(sql, filter.params).await?;
    rows.pop().map(decode_row).transpose()
  }

  async fn count<E: Entity>(&self, predicate: Predicate) -> Result<u64> {
    let filter = compile_filter::<E>(&predicate)?;
    let sql = format!("SELECT COUNT(*) FROM {} {}", E::TABLE, filter.sql);

    let n: i64 = self
      .conn
      .call(move |conn| {
        let n = conn.query_row(&sql, params_from_iter(filter.params), |r| r.get(0))?;
        Ok(n)
      })
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn search<E: Entity>(&self, query: ListQuery) -> Result<Paginated<E>> {
    let compiled = compile_search::<E>(&query)?;
    debug!(sql = %compiled.select, "search");
    let width = E::COLUMNS.len();

    // Page and total are read in one transaction so they agree.
    let (raws, total): (Vec<Vec<Sql>>, i64) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = {
          let mut stmt = tx.prepare(&compiled.select)?;
          stmt
            .query_map(params_from_iter(compiled.select_params), |row| {
              (0..width).map(|i| row.get::<_, Sql>(i)).collect()
            })?
            .collect::<rusqlite::Result<Vec<Vec<Sql>>>>()?
        };
        let total: i64 = tx.query_row(
          &compiled.count,
          params_from_iter(compiled.count_params),
          |r| r.get(0),
        )?;
        tx.commit()?;
        Ok((raws, total))
      })
      .await?;

    let data = raws.into_iter().map(decode_row).collect::<Result<Vec<E>>>()?;
    Ok(Paginated {
      pagination: Pagination::new(query.page, total.max(0) as u64),
      data,
    })
  }
}
