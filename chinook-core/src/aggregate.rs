//! Read-side aggregation shared by every store backend.
//!
//! Grouping can happen in SQL or in memory, but ranking, tie handling
//! and money arithmetic all go through these functions so both
//! backends order and round identically.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Result, StoreError};
use crate::model::{
    display_name, CountryTally, CustomerId, GenreAffinity, SpenderRanking, UNKNOWN_COUNTRY,
};

/// One invoice total attributed to a customer
#[derive(Debug, Clone)]
pub struct InvoiceAmount {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub total: Decimal,
}

/// Keep every element whose metric equals the maximum observed metric.
///
/// Ties are all kept; no element is dropped by numbering. Input order
/// is preserved among the survivors.
pub fn tie_inclusive_max<T, K, F>(items: Vec<T>, metric: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let Some(max) = items.iter().map(&metric).max() else {
        return Vec::new();
    };
    items.into_iter().filter(|item| metric(item) == max).collect()
}

/// Reduce per-genre purchase counts to the genre(s) with the highest
/// count, ordered by genre name.
pub fn top_genres(counts: Vec<GenreAffinity>) -> Vec<GenreAffinity> {
    let mut top = tie_inclusive_max(counts, |affinity| affinity.purchases);
    top.sort_by(|a, b| a.genre.cmp(&b.genre));
    top
}

/// Sum invoice amounts per customer and rank by total spent.
///
/// Customers appear only if they have at least one invoice. Equal
/// totals are ordered by customer id.
pub fn rank_spenders<I>(amounts: I) -> Vec<SpenderRanking>
where
    I: IntoIterator<Item = InvoiceAmount>,
{
    let mut totals: BTreeMap<CustomerId, SpenderRanking> = BTreeMap::new();
    for amount in amounts {
        totals
            .entry(amount.customer_id)
            .and_modify(|ranking| ranking.total_spent += amount.total)
            .or_insert_with(|| SpenderRanking {
                customer_id: amount.customer_id,
                name: display_name(&amount.first_name, &amount.last_name),
                total_spent: amount.total,
            });
    }

    let mut ranked: Vec<_> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then(a.customer_id.cmp(&b.customer_id))
    });
    ranked
}

/// Group customers by country, substituting [`UNKNOWN_COUNTRY`] for
/// absent values. Largest tally first, equal counts by label.
pub fn tally_countries<I>(countries: I) -> Vec<CountryTally>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for country in countries {
        let label = country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());
        *counts.entry(label).or_default() += 1;
    }

    let mut tallies: Vec<_> = counts
        .into_iter()
        .map(|(country, count)| CountryTally { country, count })
        .collect();
    // stable: BTreeMap already yielded labels ascending
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

/// Parse a stored monetary amount exactly.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| StoreError::decode(text, "Invoice.Total"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affinity(genre: &str, purchases: i64) -> GenreAffinity {
        GenreAffinity {
            customer_id: 1,
            name: "Ann Lee".into(),
            genre: genre.into(),
            purchases,
        }
    }

    fn amount(customer_id: CustomerId, total: &str) -> InvoiceAmount {
        InvoiceAmount {
            customer_id,
            first_name: format!("First{}", customer_id),
            last_name: "Last".into(),
            total: total.parse().unwrap(),
        }
    }

    #[test]
    fn tie_inclusive_max_keeps_every_tie() {
        let top = top_genres(vec![
            affinity("Rock", 5),
            affinity("Jazz", 3),
            affinity("Blues", 5),
        ]);
        let genres: Vec<_> = top.iter().map(|a| a.genre.as_str()).collect();
        assert_eq!(genres, vec!["Blues", "Rock"]);
    }

    #[test]
    fn tie_inclusive_max_single_winner() {
        let top = top_genres(vec![affinity("Rock", 2), affinity("Jazz", 7)]);
        assert_eq!(top, vec![affinity("Jazz", 7)]);
    }

    #[test]
    fn tie_inclusive_max_empty() {
        assert!(top_genres(Vec::new()).is_empty());
        assert!(tie_inclusive_max(Vec::<i32>::new(), |n| *n).is_empty());
    }

    #[test]
    fn tie_inclusive_max_preserves_input_order() {
        let kept = tie_inclusive_max(vec![3, 1, 3, 2, 3], |n| *n);
        assert_eq!(kept, vec![3, 3, 3]);
    }

    #[test]
    fn rank_spenders_sums_exactly() {
        // 0.1 + 0.2 drifts in binary floating point
        let ranked = rank_spenders(vec![amount(1, "0.1"), amount(1, "0.2"), amount(2, "0.29")]);
        assert_eq!(ranked[0].customer_id, 1);
        assert_eq!(ranked[0].total_spent, "0.3".parse::<Decimal>().unwrap());
        assert_eq!(ranked[0].name, "First1 Last");
        assert_eq!(ranked[1].customer_id, 2);
    }

    #[test]
    fn rank_spenders_breaks_ties_by_id() {
        let ranked = rank_spenders(vec![amount(9, "5.94"), amount(4, "5.94"), amount(6, "1.00")]);
        let ids: Vec<_> = ranked.iter().map(|r| r.customer_id).collect();
        assert_eq!(ids, vec![4, 9, 6]);
    }

    #[test]
    fn rank_spenders_empty() {
        assert!(rank_spenders(Vec::new()).is_empty());
    }

    #[test]
    fn tally_countries_substitutes_unknown() {
        let tallies = tally_countries(vec![
            Some("Brazil".to_string()),
            None,
            Some("Brazil".to_string()),
            None,
            Some("".to_string()),
            Some("Austria".to_string()),
        ]);
        assert_eq!(
            tallies,
            vec![
                CountryTally { country: "Brazil".into(), count: 2 },
                CountryTally { country: UNKNOWN_COUNTRY.into(), count: 2 },
                CountryTally { country: "".into(), count: 1 },
                CountryTally { country: "Austria".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn parse_amount_variants() {
        assert_eq!(parse_amount("1.98").unwrap(), "1.98".parse::<Decimal>().unwrap());
        assert_eq!(parse_amount("2.0").unwrap(), Decimal::from(2));
        assert_eq!(parse_amount("13").unwrap(), Decimal::from(13));
        assert_eq!(parse_amount("1.5e2").unwrap(), Decimal::from(150));
        assert!(matches!(
            parse_amount("twelve"),
            Err(StoreError::Decode { .. })
        ));
    }
}
