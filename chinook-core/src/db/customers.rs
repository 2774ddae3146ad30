//! Customer repository over the Chinook schema
//!
//! Joins used by the aggregations:
//! Customer -> Invoice -> InvoiceLine -> Track -> Genre

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument, warn};

use crate::aggregate::{self, InvoiceAmount};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::model::{
    display_name, CountryTally, CustomerId, CustomerRecord, GenreAffinity, NewCustomer,
    SpenderRanking, UNKNOWN_COUNTRY,
};
use crate::store::{validate_required, CustomerStore, NameFilter};

use super::pool::{create_memory_pool, create_pool};

/// Customer row as selected from the `Customer` table
#[derive(Debug, FromRow)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    country: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
}

impl From<CustomerRow> for CustomerRecord {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            country: row.country,
            postal_code: row.postal_code,
            phone: row.phone,
        }
    }
}

#[derive(Debug, FromRow)]
struct TallyRow {
    label: String,
    tally: i64,
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    customer_id: i64,
    first_name: String,
    last_name: String,
    total: Option<String>,
}

#[derive(Debug, FromRow)]
struct GenreCountRow {
    customer_id: i64,
    first_name: String,
    last_name: String,
    genre: String,
    purchases: i64,
}

/// Customer store backed by a Chinook SQLite database
#[derive(Debug, Clone)]
pub struct SqliteCustomerStore {
    pool: SqlitePool,
}

impl SqliteCustomerStore {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database named by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let pool = create_pool(config).await?;
        debug!(url = %config.database_url, "Opened customer store");
        Ok(Self::new(pool))
    }

    /// Open an empty private in-memory database. The caller is
    /// responsible for creating the schema through [`Self::pool`].
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(create_memory_pool().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CustomerStore for SqliteCustomerStore {
    async fn get_all(&self) -> Result<Vec<CustomerRecord>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                CustomerId AS id,
                FirstName AS first_name,
                LastName AS last_name,
                Email AS email,
                Country AS country,
                PostalCode AS postal_code,
                Phone AS phone
            FROM Customer
            ORDER BY CustomerId
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "get_all");
        Ok(rows.into_iter().map(CustomerRecord::from).collect())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                CustomerId AS id,
                FirstName AS first_name,
                LastName AS last_name,
                Email AS email,
                Country AS country,
                PostalCode AS postal_code,
                Phone AS phone
            FROM Customer
            WHERE CustomerId = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(id, found = row.is_some(), "get_by_id");
        Ok(row.map(CustomerRecord::from))
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<CustomerRecord>> {
        // SQLite lower() folds ASCII only, so matching happens on this side
        let filter = NameFilter::new(fragment);
        let customers: Vec<CustomerRecord> = self
            .get_all()
            .await?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();

        debug!(fragment, count = customers.len(), "search_by_name");
        Ok(customers)
    }

    async fn get_page(&self, limit: u32, offset: u64) -> Result<Vec<CustomerRecord>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                CustomerId AS id,
                FirstName AS first_name,
                LastName AS last_name,
                Email AS email,
                Country AS country,
                PostalCode AS postal_code,
                Phone AS phone
            FROM Customer
            ORDER BY CustomerId
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        debug!(limit, offset, count = rows.len(), "get_page");
        Ok(rows.into_iter().map(CustomerRecord::from).collect())
    }

    #[instrument(skip_all)]
    async fn add_customer(&self, customer: &NewCustomer) -> Result<CustomerId> {
        validate_required(&customer.first_name, &customer.last_name, &customer.email)?;

        let result = sqlx::query(
            r#"
            INSERT INTO Customer (FirstName, LastName, Email, Country, PostalCode, Phone)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.country)
        .bind(&customer.postal_code)
        .bind(&customer.phone)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Inserted customer");
        Ok(id)
    }

    #[instrument(skip_all, fields(id = customer.id))]
    async fn update_customer(&self, customer: &CustomerRecord) -> Result<()> {
        validate_required(&customer.first_name, &customer.last_name, &customer.email)?;

        let result = sqlx::query(
            r#"
            UPDATE Customer
            SET FirstName = ?,
                LastName = ?,
                Email = ?,
                Country = ?,
                PostalCode = ?,
                Phone = ?
            WHERE CustomerId = ?
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.country)
        .bind(&customer.postal_code)
        .bind(&customer.phone)
        .bind(customer.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Update matched no customer");
            return Err(StoreError::not_found("customer", customer.id));
        }
        debug!("Updated customer");
        Ok(())
    }

    async fn count_by_country(&self) -> Result<Vec<CountryTally>> {
        let rows: Vec<TallyRow> = sqlx::query_as(
            r#"
            SELECT
                COALESCE(Country, ?) AS label,
                COUNT(*) AS tally
            FROM Customer
            GROUP BY label
            ORDER BY tally DESC, label ASC
            "#,
        )
        .bind(UNKNOWN_COUNTRY)
        .fetch_all(&self.pool)
        .await?;

        debug!(groups = rows.len(), "count_by_country");
        Ok(rows
            .into_iter()
            .map(|row| CountryTally {
                country: row.label,
                count: row.tally,
            })
            .collect())
    }

    async fn top_spenders(&self) -> Result<Vec<SpenderRanking>> {
        // Totals leave SQLite as text so the sum never passes through f64
        let rows: Vec<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT
                c.CustomerId AS customer_id,
                c.FirstName AS first_name,
                c.LastName AS last_name,
                CAST(i.Total AS TEXT) AS total
            FROM Customer c
            JOIN Invoice i ON i.CustomerId = c.CustomerId
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let invoices = rows.len();
        let amounts = rows
            .into_iter()
            .map(|row| {
                let total = row
                    .total
                    .ok_or_else(|| StoreError::decode("NULL", "Invoice.Total"))?;
                Ok(InvoiceAmount {
                    customer_id: row.customer_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    total: aggregate::parse_amount(&total)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ranked = aggregate::rank_spenders(amounts);
        debug!(invoices, customers = ranked.len(), "top_spenders");
        Ok(ranked)
    }

    async fn most_popular_genre(&self, id: CustomerId) -> Result<Vec<GenreAffinity>> {
        // One unit per invoice line, not per quantity
        let rows: Vec<GenreCountRow> = sqlx::query_as(
            r#"
            SELECT
                c.CustomerId AS customer_id,
                c.FirstName AS first_name,
                c.LastName AS last_name,
                COALESCE(g.Name, '') AS genre,
                COUNT(il.InvoiceLineId) AS purchases
            FROM Customer c
            JOIN Invoice i ON i.CustomerId = c.CustomerId
            JOIN InvoiceLine il ON il.InvoiceId = i.InvoiceId
            JOIN Track t ON t.TrackId = il.TrackId
            JOIN Genre g ON g.GenreId = t.GenreId
            WHERE c.CustomerId = ?
            GROUP BY c.CustomerId, c.FirstName, c.LastName, g.GenreId, g.Name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| GenreAffinity {
                customer_id: row.customer_id,
                name: display_name(&row.first_name, &row.last_name),
                genre: row.genre,
                purchases: row.purchases,
            })
            .collect();

        let top = aggregate::top_genres(counts);
        debug!(id, tied = top.len(), "most_popular_genre");
        Ok(top)
    }
}
