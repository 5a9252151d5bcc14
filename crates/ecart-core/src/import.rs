//! CSV expense import
//!
//! Expected columns (header row required): `date,amount,description,centre`,
//! where `centre` is the centre's name. Each row gets a SHA-256 import hash so
//! re-importing the same file does not duplicate expenses.

use std::collections::BTreeSet;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::NewExpense;
use crate::store::{CentreStore, ExpenseStore};

/// One parsed CSV row, not yet resolved to a centre id
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub centre: String,
    pub import_hash: String,
}

/// Outcome of [`import_expenses`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows whose hash was already present
    pub duplicates: usize,
    /// Centre names with no matching centre; their rows were skipped
    pub unknown_centres: Vec<String>,
    pub skipped: usize,
}

/// Parse expense rows from CSV
///
/// Fails on the first malformed row, naming its line.
pub fn parse_expense_csv<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |i: usize, name: &str| -> Result<&str> {
            record
                .get(i)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::Import(format!("Line {}: missing {}", line, name)))
        };

        let date = parse_date(field(0, "date")?)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;
        let amount = parse_amount(field(1, "amount")?)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;
        if amount == 0.0 {
            return Err(Error::Import(format!("Line {}: amount must not be zero", line)));
        }
        let description = field(2, "description")?.to_string();
        let centre = field(3, "centre")?.to_string();

        let import_hash = import_hash(&date, amount, &description, &centre);
        rows.push(ImportRow {
            date,
            amount,
            description,
            centre,
            import_hash,
        });
    }

    debug!("Parsed {} expense rows", rows.len());
    Ok(rows)
}

/// Dedupe hash over the row's content
pub fn import_hash(date: &NaiveDate, amount: f64, description: &str, centre: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(description.as_bytes());
    hasher.update([0u8]);
    hasher.update(centre.as_bytes());
    hex::encode(hasher.finalize())
}

/// Store parsed rows as expenses authored by `author`
pub fn import_expenses<S>(store: &S, rows: &[ImportRow], author: &str) -> Result<ImportSummary>
where
    S: CentreStore + ExpenseStore + ?Sized,
{
    let centres = store.list_centres()?;
    let mut summary = ImportSummary::default();
    let mut unknown = BTreeSet::new();

    for row in rows {
        let Some(centre) = centres.iter().find(|c| c.name == row.centre) else {
            unknown.insert(row.centre.clone());
            summary.skipped += 1;
            continue;
        };

        let expense = NewExpense {
            date: row.date,
            amount: row.amount,
            description: row.description.clone(),
            centre_id: centre.id,
        };
        match store.import_expense(&expense, author, &row.import_hash)? {
            Some(_) => summary.imported += 1,
            None => summary.duplicates += 1,
        }
    }

    summary.unknown_centres = unknown.into_iter().collect();
    if !summary.unknown_centres.is_empty() {
        warn!(
            "Skipped {} rows for unknown centres: {}",
            summary.skipped,
            summary.unknown_centres.join(", ")
        );
    }
    info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        "Expense import finished"
    );
    Ok(summary)
}

/// Parse a date in ISO or day-first form
fn parse_date(s: &str) -> Result<NaiveDate> {
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, accepting currency symbols, spaces and a decimal comma
fn parse_amount(s: &str) -> Result<f64> {
    let mut cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$'))
        .collect();

    if cleaned.contains(',') {
        cleaned = if cleaned.contains('.') {
            cleaned.replace(',', "")
        } else {
            cleaned.replace(',', ".")
        };
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::{date, seeded_store};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date("2024-01-15"));
        assert_eq!(parse_date("15/01/2024").unwrap(), date("2024-01-15"));
        assert_eq!(parse_date("15-01-2024").unwrap(), date("2024-01-15"));
        assert!(parse_date("January 15").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("1 234,56 €").unwrap(), 1234.56);
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-20").unwrap(), -20.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn test_parse_expense_csv() {
        let csv = "date,amount,description,centre\n\
                   2024-01-10,700,Audit fees,Finance\n\
                   \n\
                   02/03/2024, 600.50 , Laptops ,IT\n";

        let rows = parse_expense_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date("2024-01-10"));
        assert_eq!(rows[0].centre, "Finance");
        assert_eq!(rows[1].date, date("2024-03-02"));
        assert_eq!(rows[1].amount, 600.5);
        assert_eq!(rows[1].description, "Laptops");
        assert_ne!(rows[0].import_hash, rows[1].import_hash);
    }

    #[test]
    fn test_parse_expense_csv_reports_line() {
        let csv = "date,amount,description,centre\n\
                   2024-01-10,700,Audit fees,Finance\n\
                   2024-01-11,0,Nothing,Finance\n";
        let err = parse_expense_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 3"));

        let csv = "date,amount,description,centre\n2024-01-10,700,,Finance\n";
        let err = parse_expense_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing description"));
    }

    #[test]
    fn test_import_hash_stable() {
        let d = date("2024-01-10");
        assert_eq!(
            import_hash(&d, 700.0, "Audit fees", "Finance"),
            import_hash(&d, 700.0, "Audit fees", "Finance")
        );
        assert_ne!(
            import_hash(&d, 700.0, "Audit fees", "Finance"),
            import_hash(&d, 700.0, "Audit fees", "IT")
        );
        assert_eq!(import_hash(&d, 1.0, "a", "b").len(), 64);
    }

    #[test]
    fn test_import_expenses_dedupes_and_skips_unknown() {
        let (store, ids) = seeded_store();
        let before = store.list_expenses().unwrap().len();
        let csv = "date,amount,description,centre\n\
                   2024-04-01,120,Cloud hosting,IT\n\
                   2024-04-02,80,Stationery,Finance\n\
                   2024-04-03,55,Flowers,Reception\n";
        let rows = parse_expense_csv(csv.as_bytes()).unwrap();

        let summary = import_expenses(&store, &rows, "amina").unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.duplicates, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unknown_centres, vec!["Reception"]);

        let again = import_expenses(&store, &rows, "amina").unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 2);

        let expenses = store.list_expenses().unwrap();
        assert_eq!(expenses.len(), before + 2);
        let hosting = expenses
            .iter()
            .find(|e| e.description == "Cloud hosting")
            .unwrap();
        assert_eq!(hosting.centre_id, ids.it);
        assert_eq!(hosting.created_by, "amina");
    }

    #[test]
    fn test_import_into_empty_store() {
        let store = MemoryStore::new();
        let rows = parse_expense_csv("date,amount,description,centre\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
        let summary = import_expenses(&store, &rows, "amina").unwrap();
        assert_eq!(summary, ImportSummary::default());
    }
}
