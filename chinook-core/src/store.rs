//! The customer store contract.
//!
//! Every method is a self-contained request/response: no state carries
//! over between calls and nothing is retried. Failures surface to the
//! caller as [`StoreError`](crate::StoreError).

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::model::{
    CountryTally, CustomerId, CustomerRecord, GenreAffinity, NewCustomer, SpenderRanking,
};

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Every customer. Callers must not rely on the order.
    async fn get_all(&self) -> Result<Vec<CustomerRecord>>;

    /// The customer with `id`, or `None` when no row has it.
    async fn get_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>>;

    /// Customers whose first or last name contains `fragment`,
    /// case-insensitively. An empty fragment matches everyone.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<CustomerRecord>>;

    /// Up to `limit` customers by ascending id, skipping the first `offset`.
    async fn get_page(&self, limit: u32, offset: u64) -> Result<Vec<CustomerRecord>>;

    /// Persist a new customer and return its assigned identifier.
    async fn add_customer(&self, customer: &NewCustomer) -> Result<CustomerId>;

    /// Overwrite every mutable field of the customer with `customer.id`.
    ///
    /// Fails with `NotFound` when no such row exists.
    async fn update_customer(&self, customer: &CustomerRecord) -> Result<()>;

    /// Customer counts per country, largest first, ties by label.
    async fn count_by_country(&self) -> Result<Vec<CountryTally>>;

    /// Customers with at least one invoice, by total spent descending,
    /// ties by customer id.
    async fn top_spenders(&self) -> Result<Vec<SpenderRanking>>;

    /// Every genre tied for the customer's highest purchase count,
    /// ordered by genre name. Empty when the customer bought nothing.
    async fn most_popular_genre(&self, id: CustomerId) -> Result<Vec<GenreAffinity>>;
}

/// Reject payloads whose required fields are empty or whitespace.
pub(crate) fn validate_required(first: &str, last: &str, email: &str) -> Result<()> {
    for (field, value) in [("first_name", first), ("last_name", last), ("email", email)] {
        if value.trim().is_empty() {
            return Err(StoreError::validation(field));
        }
    }
    Ok(())
}

/// Name search fragment, lowercased once with full Unicode case mapping.
///
/// Both backends filter through this so "LUÍS" finds "Luís" everywhere.
/// The fragment is matched literally: `%` and `_` carry no meaning.
#[derive(Debug, Clone)]
pub(crate) struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub(crate) fn new(fragment: &str) -> Self {
        Self {
            needle: fragment.to_lowercase(),
        }
    }

    pub(crate) fn matches(&self, customer: &CustomerRecord) -> bool {
        self.needle.is_empty()
            || contains_ignore_case(&customer.first_name, &self.needle)
            || contains_ignore_case(&customer.last_name, &self.needle)
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
