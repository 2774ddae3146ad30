//! SQLite-backed customer store
//!
//! # Design Principles
//!
//! - Connection pool, one checkout per operation; the guard returns the
//!   connection on every exit path
//! - Opens an existing Chinook database; never creates or migrates schema
//! - Grouping happens in SQL, ranking and money arithmetic in
//!   [`aggregate`](crate::aggregate)

pub mod customers;
pub mod pool;

pub use customers::SqliteCustomerStore;
pub use pool::{create_memory_pool, create_pool};
