//! Store-backed report entry points
//!
//! Thin glue shared by the HTTP handlers and the CLI: read from a store, run
//! the pure aggregation/forecast/variance code, render.

use tracing::debug;

use crate::config::ReportConfig;
use crate::error::Result;
use crate::forecast::{forecast, ForecastOutcome};
use crate::quarter::aggregate_by_quarter;
use crate::spreadsheet::WorkbookRenderer;
use crate::store::{BudgetStore, CentreStore, ExpenseStore};
use crate::variance::{build_variance_report, VarianceReport};

/// Forecast a centre's total for the target quarter from its expense history
pub fn predict_centre_total<S>(
    store: &S,
    centre_id: i64,
    year: i32,
    quarter: u32,
) -> Result<ForecastOutcome>
where
    S: ExpenseStore + ?Sized,
{
    let expenses = store.list_expenses_for_centre(centre_id)?;
    let buckets = aggregate_by_quarter(&expenses);
    debug!(
        centre_id,
        expenses = expenses.len(),
        buckets = buckets.len(),
        "Aggregated centre history"
    );
    Ok(forecast(&buckets, year, quarter))
}

/// Build the variance report over every budget and expense
pub fn variance_report<S>(store: &S, config: &ReportConfig) -> Result<VarianceReport>
where
    S: BudgetStore + CentreStore + ExpenseStore + ?Sized,
{
    let budgets = store.list_budgets()?;
    let centres = store.list_centres()?;
    let expenses = store.list_expenses()?;
    Ok(build_variance_report(
        &budgets,
        &centres,
        &expenses,
        &config.designated_centres,
    ))
}

/// Variance workbook bytes, ready to download
pub fn export_workbook<S>(store: &S, config: &ReportConfig) -> Result<Vec<u8>>
where
    S: BudgetStore + CentreStore + ExpenseStore + ?Sized,
{
    let report = variance_report(store, config)?;
    WorkbookRenderer::new(config.column_padding)
        .render(&report.analysis_table(), &report.ledger_table())
}
