//! Entity model returned by the customer store.
//!
//! Plain records with no behavior beyond small field helpers. Derived
//! entities (tallies, rankings, affinities) have no persisted identity
//! and are recomputed on every query.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned customer identifier
pub type CustomerId = i64;

/// Label substituted for customers without a stored country.
/// Used for grouping and display only, never written back.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Insert payload: a customer before the store assigns its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Create a payload with the required fields; optional fields start absent.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            country: None,
            postal_code: None,
            phone: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: CustomerId) -> CustomerRecord {
        CustomerRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            country: self.country,
            postal_code: self.postal_code,
            phone: self.phone,
        }
    }
}

/// A persisted customer.
///
/// `first_name`, `last_name` and `email` are never empty once stored.
/// Optional fields keep `None` distinct from `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
}

impl CustomerRecord {
    /// First and last name joined with a single space.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }

    /// Drop the identifier, keeping every other field.
    pub fn into_new(self) -> NewCustomer {
        NewCustomer {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            country: self.country,
            postal_code: self.postal_code,
            phone: self.phone,
        }
    }
}

pub(crate) fn display_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last)
}

/// Number of customers sharing a country label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryTally {
    pub country: String,
    pub count: i64,
}

/// A customer's exact lifetime spend across all invoices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpenderRanking {
    pub customer_id: CustomerId,
    pub name: String,
    pub total_spent: Decimal,
}

/// Track purchases by one customer attributed to one genre,
/// counted per invoice line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreAffinity {
    pub customer_id: CustomerId,
    pub name: String,
    pub genre: String,
    pub purchases: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_id_keeps_every_field() {
        let new = NewCustomer::new("Ann", "Lee", "a@x.com")
            .with_country("Norway")
            .with_phone("");
        let record = new.clone().with_id(7);

        assert_eq!(record.id, 7);
        assert_eq!(record.country.as_deref(), Some("Norway"));
        assert_eq!(record.phone.as_deref(), Some(""));
        assert_eq!(record.postal_code, None);
        assert_eq!(record.into_new(), new);
    }

    #[test]
    fn display_name_joins_with_single_space() {
        let record = NewCustomer::new("Ann", "Lee", "a@x.com").with_id(1);
        assert_eq!(record.display_name(), "Ann Lee");
    }

    #[test]
    fn decimal_serializes_as_string() {
        let ranking = SpenderRanking {
            customer_id: 1,
            name: "Ann Lee".into(),
            total_spent: "39.62".parse().unwrap(),
        };
        let json = serde_json::to_value(&ranking).unwrap();
        assert_eq!(json["total_spent"], "39.62");
    }
}
