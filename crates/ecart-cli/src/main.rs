//! Ecart CLI - Budget variance analysis and expense forecasting
//!
//! Usage:
//!   ecart init                                   Initialize database
//!   ecart expenses import --file CSV             Import expenses
//!   ecart forecast --centre IT -q 3 -y 2024      Forecast a quarter
//!   ecart export --out report.xlsx               Write the variance workbook
//!   ecart serve --port 3000                      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            commands::cmd_serve(
                &cli.db,
                cli.config.as_deref(),
                &host,
                port,
                no_auth,
                cli.no_encrypt,
            )
            .await
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            match action {
                UsersAction::List => commands::cmd_users_list(&db),
                UsersAction::Add { username, role } => {
                    commands::cmd_users_add(&db, &caller, &username, &role)
                }
                UsersAction::SetRole { username, role } => {
                    commands::cmd_users_set_role(&db, &caller, &username, &role)
                }
                UsersAction::Remove { username } => {
                    commands::cmd_users_remove(&db, &caller, &username)
                }
            }
        }
        Commands::Responsables { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            match action {
                ResponsablesAction::List => commands::cmd_responsables_list(&db),
                ResponsablesAction::Add { nom, prenom } => {
                    commands::cmd_responsables_add(&db, &caller, &nom, &prenom)
                }
                ResponsablesAction::Edit { id, nom, prenom } => commands::cmd_responsables_edit(
                    &db,
                    &caller,
                    id,
                    nom.as_deref(),
                    prenom.as_deref(),
                ),
                ResponsablesAction::Remove { id } => {
                    commands::cmd_responsables_remove(&db, &caller, id)
                }
            }
        }
        Commands::Centres { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            match action {
                CentresAction::List => commands::cmd_centres_list(&db),
                CentresAction::Add { name, responsable } => {
                    commands::cmd_centres_add(&db, &caller, &name, responsable)
                }
                CentresAction::Edit {
                    centre,
                    name,
                    responsable,
                } => commands::cmd_centres_edit(&db, &caller, &centre, name.as_deref(), responsable),
                CentresAction::Remove { centre } => {
                    commands::cmd_centres_remove(&db, &caller, &centre)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            match action {
                BudgetsAction::List => commands::cmd_budgets_list(&db),
                BudgetsAction::Add {
                    centre,
                    quarter,
                    year,
                    amount,
                } => commands::cmd_budgets_add(&db, &caller, &centre, quarter, year, amount),
                BudgetsAction::Edit {
                    id,
                    centre,
                    quarter,
                    year,
                    amount,
                } => commands::cmd_budgets_edit(
                    &db,
                    &caller,
                    id,
                    centre.as_deref(),
                    quarter,
                    year,
                    amount,
                ),
                BudgetsAction::Remove { id } => commands::cmd_budgets_remove(&db, &caller, id),
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            match action {
                ExpensesAction::List { centre } => {
                    commands::cmd_expenses_list(&db, centre.as_deref())
                }
                ExpensesAction::Add {
                    centre,
                    date,
                    amount,
                    description,
                } => commands::cmd_expenses_add(&db, &caller, &centre, &date, amount, &description),
                ExpensesAction::Edit {
                    id,
                    centre,
                    date,
                    amount,
                    description,
                } => commands::cmd_expenses_edit(
                    &db,
                    &caller,
                    id,
                    centre.as_deref(),
                    date.as_deref(),
                    amount,
                    description.as_deref(),
                ),
                ExpensesAction::Remove { id } => commands::cmd_expenses_remove(&db, &caller, id),
                ExpensesAction::Import { file } => {
                    commands::cmd_expenses_import(&db, &caller, &file)
                }
            }
        }
        Commands::Forecast {
            centre,
            quarter,
            year,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            commands::cmd_forecast(&db, &caller, &centre, quarter, year)
        }
        Commands::Export { out } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let caller = commands::acting_caller(&db, cli.as_user.as_deref())?;
            let config = commands::load_report_config(cli.config.as_deref())?;
            commands::cmd_export(&db, &caller, &config, &out)
        }
    }
}
