//! Unicode case folding for SQL comparisons.
//!
//! SQLite's `NOCASE` collation and `LIKE` only fold ASCII. Every
//! case-insensitive comparison instead goes through the `fold()` scalar
//! function registered here, with the bound operand folded the same way in
//! Rust, so that `Über` and `über` compare equal.

use rusqlite::{Connection, functions::FunctionFlags};

/// Name of the SQL function.
pub const FOLD: &str = "fold";

/// The folded form of `s`, as stored in case-insensitive indexes.
pub fn fold(s: &str) -> String { s.to_lowercase() }

/// Register `fold(text)` on `conn`. Must run before the schema, whose
/// unique indexes are built on it.
pub fn register(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let value: Option<String> = ctx.get(0)?;
      Ok(value.map(|v| fold(&v)))
    },
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn folds_beyond_ascii_and_keeps_null() {
    let conn = Connection::open_in_memory().unwrap();
    register(&conn).unwrap();

    let folded: String = conn
      .query_row("SELECT fold('ÄRGER im Forum')", [], |r| r.get(0))
      .unwrap();
    assert_eq!(folded, "ärger im forum");

    let null: Option<String> = conn
      .query_row("SELECT fold(NULL)", [], |r| r.get(0))
      .unwrap();
    assert_eq!(null, None);
  }
}
