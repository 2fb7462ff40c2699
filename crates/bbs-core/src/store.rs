//! The `BoardStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `bbs-store-sqlite`).
//! It is deliberately generic over [`Entity`]: the backend knows how to
//! persist any row type from its column list, and every rule about what may
//! be written lives in [`crate::forum`], not here.

use std::future::Future;

use uuid::Uuid;

use crate::{
  entity::Entity,
  query::{ListQuery, Paginated, Predicate},
};

/// Abstraction over a board storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BoardStore: Send + Sync {
  /// Must map unique-constraint violations to [`crate::Error::Conflict`]
  /// when converted.
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Persist a new row. Fails on a primary-key or unique violation.
  fn insert<E: Entity>(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Retrieve a row by id. Returns `None` if not found.
  fn get<E: Entity>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// Overwrite every column of an existing row.
  fn update<E: Entity>(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// First row matching `predicate`, in unspecified order.
  fn find_one<E: Entity>(
    &self,
    predicate: Predicate,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  fn count<E: Entity>(
    &self,
    predicate: Predicate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// One page of rows plus the total count of rows matching the predicate.
  fn search<E: Entity>(
    &self,
    query: ListQuery,
  ) -> impl Future<Output = Result<Paginated<E>, Self::Error>> + Send + '_;
}
