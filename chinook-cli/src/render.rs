//! Console rendering for store results.

use anyhow::Result;
use chinook_core::{CountryTally, CustomerRecord, GenreAffinity, SpenderRanking};
use serde::Serialize;

/// Output format selected by `--json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

pub fn customer(record: &CustomerRecord) -> String {
    format!(
        "Id:          {}\n\
         Name:        {}\n\
         Email:       {}\n\
         Country:     {}\n\
         Postal code: {}\n\
         Phone:       {}",
        record.id,
        record.display_name(),
        record.email,
        optional(&record.country),
        optional(&record.postal_code),
        optional(&record.phone),
    )
}

pub fn customers(records: &[CustomerRecord]) -> String {
    if records.is_empty() {
        return "No customers found.".to_string();
    }
    records
        .iter()
        .map(|c| {
            format!(
                "{:>5}  {:<28} {:<36} {}",
                c.id,
                c.display_name(),
                c.email,
                optional(&c.country)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tallies(tallies: &[CountryTally]) -> String {
    if tallies.is_empty() {
        return "No customers found.".to_string();
    }
    tallies
        .iter()
        .map(|t| format!("{:<24} {:>5}", t.country, t.count))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn spenders(rankings: &[SpenderRanking]) -> String {
    if rankings.is_empty() {
        return "No invoices found.".to_string();
    }
    rankings
        .iter()
        .enumerate()
        .map(|(rank, r)| {
            format!(
                "{:>3}. {:<28} (id {:>4}) {:>10}",
                rank + 1,
                r.name,
                r.customer_id,
                r.total_spent
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn genres(affinities: &[GenreAffinity]) -> String {
    match affinities.first() {
        None => "No purchases found.".to_string(),
        Some(first) => {
            let names: Vec<_> = affinities.iter().map(|a| a.genre.as_str()).collect();
            format!(
                "{} (id {}): {} ({} purchases)",
                first.name,
                first.customer_id,
                names.join(", "),
                first.purchases
            )
        }
    }
}
