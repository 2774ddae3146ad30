//! chinook-core: customer store for the Chinook music shop
//!
//! Mediates between a caller and the relational store of customers,
//! invoices and purchased tracks. Exposes point lookup, name search,
//! offset paging, create/overwrite, and three read-side aggregations
//! (country tallies, spender rankings, genre affinity).
//!
//! Two interchangeable backends implement [`CustomerStore`]:
//! - [`SqliteCustomerStore`] over an existing Chinook SQLite database
//! - [`MemoryCustomerStore`], an in-process fake with the same semantics

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod model;
pub mod pagination;
pub mod store;

pub use config::StoreConfig;
pub use db::SqliteCustomerStore;
pub use error::{Result, StoreError};
pub use memory::MemoryCustomerStore;
pub use model::{
    CountryTally, CustomerId, CustomerRecord, GenreAffinity, NewCustomer, SpenderRanking,
    UNKNOWN_COUNTRY,
};
pub use pagination::Pagination;
pub use store::CustomerStore;
