//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ecart - Budget variance analysis and expense forecasting
#[derive(Parser)]
#[command(name = "ecart")]
#[command(about = "Budget vs. actual tracking for cost centres", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ecart.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set ECART_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Report configuration file (defaults to <config dir>/ecart/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this registered user (defaults to the local admin)
    #[arg(long = "as", global = true, value_name = "USERNAME")]
    pub as_user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (local development only)
        #[arg(long)]
        no_auth: bool,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage responsables (centre managers)
    Responsables {
        #[command(subcommand)]
        action: ResponsablesAction,
    },

    /// Manage cost centres
    Centres {
        #[command(subcommand)]
        action: CentresAction,
    },

    /// Manage quarterly budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetsAction,
    },

    /// Log, list, import and remove expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },

    /// Forecast a centre's expense total for a quarter
    Forecast {
        /// Centre id or name
        #[arg(short, long)]
        centre: String,

        /// Target quarter (1-4)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=4))]
        quarter: u32,

        /// Target year
        #[arg(short, long)]
        year: i32,
    },

    /// Write the budget variance workbook
    Export {
        /// Output file
        #[arg(short, long, default_value = "Analyse_Budgets_Depenses.xlsx")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,

    /// Register a user
    Add {
        username: String,

        /// Role: admin or assistant
        #[arg(short, long, default_value = "assistant")]
        role: String,
    },

    /// Change a user's role
    SetRole {
        username: String,

        /// Role: admin or assistant
        role: String,
    },

    /// Remove a user
    Remove { username: String },
}

#[derive(Subcommand)]
pub enum ResponsablesAction {
    /// List responsables
    List,

    /// Add a responsable
    Add {
        /// Last name
        #[arg(long)]
        nom: String,

        /// First name
        #[arg(long)]
        prenom: String,
    },

    /// Rename a responsable
    Edit {
        id: i64,

        /// New last name
        #[arg(long)]
        nom: Option<String>,

        /// New first name
        #[arg(long)]
        prenom: Option<String>,
    },

    /// Remove a responsable (their centres are kept without an owner)
    Remove { id: i64 },
}

#[derive(Subcommand)]
pub enum CentresAction {
    /// List centres
    List,

    /// Add a centre
    Add {
        name: String,

        /// Owning responsable id
        #[arg(short, long)]
        responsable: i64,
    },

    /// Rename a centre or change its responsable
    Edit {
        /// Centre id or name
        centre: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New responsable id
        #[arg(short, long)]
        responsable: Option<i64>,
    },

    /// Remove a centre
    Remove {
        /// Centre id or name
        centre: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets
    List,

    /// Add a budget for a centre and quarter
    Add {
        /// Centre id or name
        #[arg(short, long)]
        centre: String,

        /// Quarter (1-4)
        #[arg(short, long)]
        quarter: u32,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Budgeted amount
        #[arg(short, long)]
        amount: f64,
    },

    /// Change a budget's centre, period or amount
    Edit {
        id: i64,

        /// Centre id or name
        #[arg(short, long)]
        centre: Option<String>,

        /// Quarter (1-4)
        #[arg(short, long)]
        quarter: Option<u32>,

        /// Year
        #[arg(short, long)]
        year: Option<i32>,

        /// Budgeted amount
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Remove a budget
    Remove { id: i64 },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses
    List {
        /// Only this centre (id or name)
        #[arg(short, long)]
        centre: Option<String>,
    },

    /// Log an expense
    Add {
        /// Centre id or name
        #[arg(short, long)]
        centre: String,

        /// Expense date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// Description
        #[arg(short = 'D', long)]
        description: String,
    },

    /// Edit an expense (author or admin)
    Edit {
        id: i64,

        /// Centre id or name
        #[arg(short, long)]
        centre: Option<String>,

        /// Expense date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<f64>,

        /// Description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Remove an expense (author or admin)
    Remove { id: i64 },

    /// Import expenses from CSV (date,amount,description,centre)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },
}
