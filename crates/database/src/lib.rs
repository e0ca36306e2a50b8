//! # District HR Database Crate
//!
//! The storage layer for the HR service. Everything the web server reads or
//! writes goes through the [`HrStore`] trait, which has two implementations:
//!
//! - [`DbRepository`]: the PostgreSQL store. Queries are built at runtime with
//!   `sqlx::query_as`, and every status change is a single conditional
//!   `UPDATE ... WHERE status = ANY(...)`.
//! - [`InMemoryRepository`]: a process-local store with the same semantics,
//!   used by `serve --in-memory` and by the test suites.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool setup and embedded schema migrations.
//! - `run_cleanup`: empties every business table and reports what it removed.
//! - `DbError`: the error type returned from this crate.

pub mod cleanup;
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

pub use cleanup::{clear_tables, run_cleanup, CleanupReport, TableCleanup, CLEANUP_TABLES};
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::InMemoryRepository;
pub use repository::DbRepository;
pub use store::{HrStore, TransitionInput};
