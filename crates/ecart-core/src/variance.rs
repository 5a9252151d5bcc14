//! Budget vs. actual variance report
//!
//! Produces two tables from the full set of budgets, centres and expenses:
//! - the variance analysis, one row per budget record
//! - a flat ledger of every expense booked against the designated centres

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Budget, Centre, Expense};
use crate::quarter::period_of;
use crate::spreadsheet::{Cell, Table};

/// Display name used when a centre reference does not resolve
pub const UNKNOWN_CENTRE: &str = "N/A";

/// Column headers of the variance analysis sheet
pub const ANALYSIS_COLUMNS: [&str; 8] = [
    "Centre",
    "Quarter",
    "Year",
    "Budget Amount",
    "Actual",
    "Deviation",
    "Deviation Rate (%)",
    "Interpretation",
];

/// Column headers of the ledger sheet
pub const LEDGER_COLUMNS: [&str; 5] = [
    "Quarter",
    "Centre",
    "Expense Type",
    "Expense Date",
    "Actual Amount",
];

/// How a deviation reads for the budget owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    /// Spent more than budgeted
    Overrun,
    /// Spent less than budgeted
    Saving,
    Neutral,
}

impl Interpretation {
    /// Classify a deviation rate by its sign
    pub fn from_rate(rate: f64) -> Self {
        if rate > 0.0 {
            Self::Overrun
        } else if rate < 0.0 {
            Self::Saving
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overrun => "overrun",
            Self::Saving => "saving",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One budget reconciled against realized expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub centre: String,
    pub quarter: u32,
    pub year: i32,
    pub budget_amount: f64,
    pub actual_amount: f64,
    /// actual - budget
    pub deviation: f64,
    /// deviation as a percentage of the budget, 0 for a zero budget
    pub deviation_rate: f64,
    pub interpretation: Interpretation,
}

/// One expense of a designated centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub quarter: u32,
    pub centre: String,
    pub description: String,
    /// YYYY-MM-DD
    pub date: String,
    pub amount: f64,
}

/// Both report tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarianceReport {
    pub analysis: Vec<VarianceRow>,
    pub ledger: Vec<LedgerRow>,
}

impl VarianceReport {
    pub fn analysis_table(&self) -> Table {
        let mut table = Table::new(&ANALYSIS_COLUMNS);
        for row in &self.analysis {
            table.push_row(vec![
                Cell::from(row.centre.as_str()),
                Cell::Integer(i64::from(row.quarter)),
                Cell::Integer(i64::from(row.year)),
                Cell::Number(row.budget_amount),
                Cell::Number(row.actual_amount),
                Cell::Number(row.deviation),
                Cell::Number(row.deviation_rate),
                Cell::from(row.interpretation.as_str()),
            ]);
        }
        table
    }

    pub fn ledger_table(&self) -> Table {
        let mut table = Table::new(&LEDGER_COLUMNS);
        for row in &self.ledger {
            table.push_row(vec![
                Cell::Integer(i64::from(row.quarter)),
                Cell::from(row.centre.as_str()),
                Cell::from(row.description.as_str()),
                Cell::from(row.date.as_str()),
                Cell::Number(row.amount),
            ]);
        }
        table
    }
}

/// Deviation as a percentage of the budget; a zero budget yields 0
pub fn deviation_rate(deviation: f64, budget_amount: f64) -> f64 {
    if budget_amount == 0.0 {
        0.0
    } else {
        deviation / budget_amount * 100.0
    }
}

/// Reconcile budgets with expenses and list the designated centres' expenses
pub fn build_variance_report(
    budgets: &[Budget],
    centres: &[Centre],
    expenses: &[Expense],
    designated_centres: &[String],
) -> VarianceReport {
    let centre_names: HashMap<i64, &str> =
        centres.iter().map(|c| (c.id, c.name.as_str())).collect();

    let mut actuals: HashMap<(i64, i32, u32), f64> = HashMap::new();
    for expense in expenses {
        let (year, quarter) = period_of(expense.date);
        *actuals
            .entry((expense.centre_id, year, quarter))
            .or_insert(0.0) += expense.amount;
    }

    let analysis = budgets
        .iter()
        .map(|budget| {
            let actual_amount = actuals
                .get(&(budget.centre_id, budget.year, budget.quarter))
                .copied()
                .unwrap_or(0.0);
            let deviation = actual_amount - budget.amount;
            let rate = deviation_rate(deviation, budget.amount);

            VarianceRow {
                centre: centre_names
                    .get(&budget.centre_id)
                    .copied()
                    .unwrap_or(UNKNOWN_CENTRE)
                    .to_string(),
                quarter: budget.quarter,
                year: budget.year,
                budget_amount: budget.amount,
                actual_amount,
                deviation,
                deviation_rate: rate,
                interpretation: Interpretation::from_rate(rate),
            }
        })
        .collect();

    let designated: HashSet<&str> = designated_centres.iter().map(String::as_str).collect();
    let ledger = expenses
        .iter()
        .filter_map(|expense| {
            let name = *centre_names.get(&expense.centre_id)?;
            if !designated.contains(name) {
                return None;
            }
            Some(LedgerRow {
                quarter: period_of(expense.date).1,
                centre: name.to_string(),
                description: expense.description.clone(),
                date: expense.date.format("%Y-%m-%d").to_string(),
                amount: expense.amount,
            })
        })
        .collect();

    VarianceReport { analysis, ledger }
}
