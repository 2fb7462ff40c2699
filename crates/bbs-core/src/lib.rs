//! Core types and trait definitions for the bulletin board.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::BoardStore`]; the HTTP layer drives
//! [`forum::Forum`], which holds every access and consistency rule.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod board;
pub mod entity;
pub mod error;
pub mod forum;
pub mod member;
pub mod moderation;
pub mod query;
pub mod search;
pub mod store;
pub mod tag;
mod validate;

pub use error::{Error, Result};
