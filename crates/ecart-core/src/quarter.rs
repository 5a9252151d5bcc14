//! Calendar quarter derivation and quarterly aggregation of expenses

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Expense;

/// Total spent in one (year, quarter)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterBucket {
    pub year: i32,
    pub quarter: u32,
    pub total_amount: f64,
}

/// Calendar quarter (1-4) of a date
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// (year, quarter) key of a date
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), quarter_of(date))
}

/// Sum dated amounts into one bucket per (year, quarter) present in the input
///
/// Buckets come out ordered by year, then quarter. Quarters with no input
/// produce no bucket, so an empty input yields an empty vec.
pub fn aggregate_amounts<I>(entries: I) -> Vec<QuarterBucket>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (date, amount) in entries {
        *totals.entry(period_of(date)).or_insert(0.0) += amount;
    }

    totals
        .into_iter()
        .map(|((year, quarter), total_amount)| QuarterBucket {
            year,
            quarter,
            total_amount,
        })
        .collect()
}

/// Aggregate expenses into quarterly buckets
pub fn aggregate_by_quarter(expenses: &[Expense]) -> Vec<QuarterBucket> {
    aggregate_amounts(expenses.iter().map(|e| (e.date, e.amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_of_every_month() {
        let expected = [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4];
        for year in [1999, 2024, 2025] {
            for (i, q) in expected.iter().enumerate() {
                let month = i as u32 + 1;
                assert_eq!(quarter_of(date(year, month, 15)), *q, "month {}", month);
            }
        }
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(quarter_of(date(2024, 3, 31)), 1);
        assert_eq!(quarter_of(date(2024, 4, 1)), 2);
        assert_eq!(quarter_of(date(2024, 12, 31)), 4);
        assert_eq!(period_of(date(2025, 1, 1)), (2025, 1));
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_amounts(Vec::new()).is_empty());
    }

    #[test]
    fn test_aggregate_groups_and_orders() {
        let buckets = aggregate_amounts(vec![
            (date(2024, 5, 2), 50.0),
            (date(2023, 11, 20), 10.0),
            (date(2024, 1, 3), 100.0),
            (date(2024, 2, 28), 25.5),
            (date(2023, 10, 1), 5.0),
        ]);

        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].year, buckets[0].quarter), (2023, 4));
        assert_eq!(buckets[0].total_amount, 15.0);
        assert_eq!((buckets[1].year, buckets[1].quarter), (2024, 1));
        assert_eq!(buckets[1].total_amount, 125.5);
        assert_eq!((buckets[2].year, buckets[2].quarter), (2024, 2));
        assert_eq!(buckets[2].total_amount, 50.0);
    }

    #[test]
    fn test_aggregate_conserves_total() {
        let entries: Vec<(NaiveDate, f64)> = (0..40)
            .map(|i| (date(2020 + i / 12, (i % 12) as u32 + 1, 1), (i as f64) * 3.25 - 20.0))
            .collect();
        let input_total: f64 = entries.iter().map(|(_, a)| a).sum();

        let buckets = aggregate_amounts(entries);
        let bucket_total: f64 = buckets.iter().map(|b| b.total_amount).sum();

        assert!((input_total - bucket_total).abs() < 1e-9);
    }

    #[test]
    fn test_same_quarter_different_years_stay_separate() {
        let buckets = aggregate_amounts(vec![(date(2023, 2, 1), 1.0), (date(2024, 2, 1), 2.0)]);
        assert_eq!(buckets.len(), 2);
    }
}
