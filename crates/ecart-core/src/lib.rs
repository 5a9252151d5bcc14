//! Ecart Core Library
//!
//! Shared functionality for the Ecart budget tracking backend:
//! - Typed records for centres, responsables, budgets, expenses and users
//! - Store traits with a SQLite implementation (and an in-memory fake for tests)
//! - Quarterly aggregation of expenses
//! - Linear trend forecasting over quarterly totals
//! - Budget vs. actual variance reports
//! - Two-sheet XLSX rendering of report tables
//! - Role-based authorization predicate
//! - CSV expense import
//! - Store-backed prediction and export entry points

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod quarter;
pub mod report;
pub mod spreadsheet;
pub mod store;
pub mod variance;

/// Test utilities including fixture builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use access::{
    authorize, create_expense_as, delete_expense_as, require, update_expense_as, Access, Action,
    Caller,
};
pub use config::ReportConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{forecast, Forecast, ForecastOutcome, TrendFit};
pub use import::{import_expenses, parse_expense_csv, ImportSummary};
pub use models::Role;
pub use quarter::{aggregate_by_quarter, quarter_of, QuarterBucket};
pub use report::{export_workbook, predict_centre_total, variance_report};
pub use spreadsheet::{render_workbook, Cell, Table, WorkbookRenderer};
pub use store::{
    AuditLog, BudgetStore, CentreStore, ExpenseStore, ResponsableStore, Store, UserStore,
};
pub use variance::{build_variance_report, Interpretation, LedgerRow, VarianceReport, VarianceRow};
