//! In-memory customer store
//!
//! Same contract and orderings as the SQLite store, with the purchase
//! history (invoices, lines, tracks, genres) held in plain maps. Used for
//! tests and for callers that want a scratch store without a database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::aggregate::{self, InvoiceAmount};
use crate::error::{Result, StoreError};
use crate::model::{
    CountryTally, CustomerId, CustomerRecord, GenreAffinity, NewCustomer, SpenderRanking,
};
use crate::store::{validate_required, CustomerStore, NameFilter};

#[derive(Debug, Clone)]
struct Invoice {
    customer_id: CustomerId,
    total: Decimal,
}

#[derive(Debug, Clone, Copy)]
struct InvoiceLine {
    invoice_id: i64,
    track_id: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, CustomerRecord>,
    genres: HashMap<i64, String>,
    /// track id -> genre id; tracks may have no genre
    tracks: HashMap<i64, Option<i64>>,
    invoices: BTreeMap<i64, Invoice>,
    lines: Vec<InvoiceLine>,
    last_customer_id: CustomerId,
    last_genre_id: i64,
    last_track_id: i64,
    last_invoice_id: i64,
}

/// Customer store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    state: Mutex<MemoryState>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a genre and return its id.
    pub async fn add_genre(&self, name: impl Into<String>) -> i64 {
        let mut state = self.state.lock().await;
        state.last_genre_id += 1;
        let id = state.last_genre_id;
        state.genres.insert(id, name.into());
        id
    }

    /// Register a track, optionally attributed to a genre, and return its id.
    pub async fn add_track(&self, genre_id: Option<i64>) -> Result<i64> {
        let mut state = self.state.lock().await;
        if let Some(genre_id) = genre_id {
            if !state.genres.contains_key(&genre_id) {
                return Err(StoreError::not_found("genre", genre_id));
            }
        }
        state.last_track_id += 1;
        let id = state.last_track_id;
        state.tracks.insert(id, genre_id);
        Ok(id)
    }

    /// Record an invoice for a customer and return its id.
    pub async fn add_invoice(&self, customer_id: CustomerId, total: Decimal) -> Result<i64> {
        let mut state = self.state.lock().await;
        if !state.customers.contains_key(&customer_id) {
            return Err(StoreError::not_found("customer", customer_id));
        }
        state.last_invoice_id += 1;
        let id = state.last_invoice_id;
        state.invoices.insert(id, Invoice { customer_id, total });
        Ok(id)
    }

    /// Record one purchased track on an invoice.
    pub async fn add_invoice_line(&self, invoice_id: i64, track_id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.invoices.contains_key(&invoice_id) {
            return Err(StoreError::not_found("invoice", invoice_id));
        }
        if !state.tracks.contains_key(&track_id) {
            return Err(StoreError::not_found("track", track_id));
        }
        state.lines.push(InvoiceLine {
            invoice_id,
            track_id,
        });
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn get_all(&self) -> Result<Vec<CustomerRecord>> {
        let state = self.state.lock().await;
        Ok(state.customers.values().cloned().collect())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let state = self.state.lock().await;
        Ok(state.customers.get(&id).cloned())
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<CustomerRecord>> {
        let filter = NameFilter::new(fragment);
        let state = self.state.lock().await;
        Ok(state
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get_page(&self, limit: u32, offset: u64) -> Result<Vec<CustomerRecord>> {
        let state = self.state.lock().await;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state
            .customers
            .values()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn add_customer(&self, customer: &NewCustomer) -> Result<CustomerId> {
        validate_required(&customer.first_name, &customer.last_name, &customer.email)?;

        let mut state = self.state.lock().await;
        state.last_customer_id += 1;
        let id = state.last_customer_id;
        state.customers.insert(id, customer.clone().with_id(id));
        debug!(id, "Inserted customer");
        Ok(id)
    }

    async fn update_customer(&self, customer: &CustomerRecord) -> Result<()> {
        validate_required(&customer.first_name, &customer.last_name, &customer.email)?;

        let mut state = self.state.lock().await;
        match state.customers.get_mut(&customer.id) {
            Some(stored) => {
                *stored = customer.clone();
                Ok(())
            }
            None => {
                warn!(id = customer.id, "Update matched no customer");
                Err(StoreError::not_found("customer", customer.id))
            }
        }
    }

    async fn count_by_country(&self) -> Result<Vec<CountryTally>> {
        let state = self.state.lock().await;
        Ok(aggregate::tally_countries(
            state.customers.values().map(|c| c.country.clone()),
        ))
    }

    async fn top_spenders(&self) -> Result<Vec<SpenderRanking>> {
        let state = self.state.lock().await;
        let amounts = state.invoices.values().filter_map(|invoice| {
            state
                .customers
                .get(&invoice.customer_id)
                .map(|c| InvoiceAmount {
                    customer_id: c.id,
                    first_name: c.first_name.clone(),
                    last_name: c.last_name.clone(),
                    total: invoice.total,
                })
        });
        Ok(aggregate::rank_spenders(amounts))
    }

    async fn most_popular_genre(&self, id: CustomerId) -> Result<Vec<GenreAffinity>> {
        let state = self.state.lock().await;
        let Some(customer) = state.customers.get(&id) else {
            return Ok(Vec::new());
        };

        let mut per_genre: BTreeMap<i64, i64> = BTreeMap::new();
        for line in &state.lines {
            let owned = state
                .invoices
                .get(&line.invoice_id)
                .is_some_and(|invoice| invoice.customer_id == id);
            if !owned {
                continue;
            }
            if let Some(Some(genre_id)) = state.tracks.get(&line.track_id) {
                *per_genre.entry(*genre_id).or_default() += 1;
            }
        }

        let name = customer.display_name();
        let counts = per_genre
            .into_iter()
            .filter_map(|(genre_id, purchases)| {
                state.genres.get(&genre_id).map(|genre| GenreAffinity {
                    customer_id: id,
                    name: name.clone(),
                    genre: genre.clone(),
                    purchases,
                })
            })
            .collect();

        Ok(aggregate::top_genres(counts))
    }
}
