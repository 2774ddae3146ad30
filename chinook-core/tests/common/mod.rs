//! Shared fixtures: a Chinook schema in memory and purchase-history
//! seeding for both store backends.
#![allow(dead_code)]

use async_trait::async_trait;
use chinook_core::{CustomerId, CustomerStore, MemoryCustomerStore, NewCustomer, SqliteCustomerStore};

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// Purchase-history seeding that the store contract itself does not offer.
#[async_trait]
pub trait Fixture: CustomerStore {
    async fn genre(&self, name: &str) -> i64;
    async fn track(&self, genre_id: Option<i64>) -> i64;
    async fn invoice(&self, customer_id: CustomerId, total: &str) -> i64;
    async fn line(&self, invoice_id: i64, track_id: i64);

    async fn customer(&self, first: &str, last: &str, country: Option<&str>) -> CustomerId {
        let email = format!("{}.{}@example.com", first, last).to_lowercase();
        let mut new = NewCustomer::new(first, last, email);
        new.country = country.map(str::to_string);
        self.add_customer(&new).await.expect("insert customer")
    }

    /// One invoice carrying `count` purchases of a fresh track in `genre_id`.
    async fn purchases(&self, customer_id: CustomerId, genre_id: i64, count: usize) {
        let track = self.track(Some(genre_id)).await;
        let invoice = self.invoice(customer_id, "0.99").await;
        for _ in 0..count {
            self.line(invoice, track).await;
        }
    }
}

pub async fn sqlite_store() -> SqliteCustomerStore {
    let store = SqliteCustomerStore::in_memory()
        .await
        .expect("in-memory database");
    sqlx::raw_sql(SCHEMA)
        .execute(store.pool())
        .await
        .expect("schema");
    store
}

pub async fn memory_store() -> MemoryCustomerStore {
    MemoryCustomerStore::new()
}

#[async_trait]
impl Fixture for SqliteCustomerStore {
    async fn genre(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO Genre (Name) VALUES (?)")
            .bind(name)
            .execute(self.pool())
            .await
            .expect("insert genre")
            .last_insert_rowid()
    }

    async fn track(&self, genre_id: Option<i64>) -> i64 {
        sqlx::query("INSERT INTO Track (Name, GenreId) VALUES ('Track', ?)")
            .bind(genre_id)
            .execute(self.pool())
            .await
            .expect("insert track")
            .last_insert_rowid()
    }

    async fn invoice(&self, customer_id: CustomerId, total: &str) -> i64 {
        sqlx::query("INSERT INTO Invoice (CustomerId, Total) VALUES (?, ?)")
            .bind(customer_id)
            .bind(total)
            .execute(self.pool())
            .await
            .expect("insert invoice")
            .last_insert_rowid()
    }

    async fn line(&self, invoice_id: i64, track_id: i64) {
        sqlx::query("INSERT INTO InvoiceLine (InvoiceId, TrackId) VALUES (?, ?)")
            .bind(invoice_id)
            .bind(track_id)
            .execute(self.pool())
            .await
            .expect("insert invoice line");
    }
}

#[async_trait]
impl Fixture for MemoryCustomerStore {
    async fn genre(&self, name: &str) -> i64 {
        self.add_genre(name).await
    }

    async fn track(&self, genre_id: Option<i64>) -> i64 {
        self.add_track(genre_id).await.expect("add track")
    }

    async fn invoice(&self, customer_id: CustomerId, total: &str) -> i64 {
        let total = total.parse().expect("decimal literal");
        self.add_invoice(customer_id, total)
            .await
            .expect("add invoice")
    }

    async fn line(&self, invoice_id: i64, track_id: i64) {
        self.add_invoice_line(invoice_id, track_id)
            .await
            .expect("add invoice line");
    }
}
