//! Expense commands

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ecart_core::db::Database;
use ecart_core::models::NewExpense;
use ecart_core::{
    create_expense_as, delete_expense_as, import_expenses, parse_expense_csv, require,
    update_expense_as, Action, AuditLog, Caller, CentreStore, ExpenseStore,
};

use super::resolve_centre;

pub fn cmd_expenses_list(db: &Database, centre: Option<&str>) -> Result<()> {
    let expenses = match centre {
        Some(arg) => {
            let centre = resolve_centre(db, arg)?;
            db.list_expenses_for_centre(centre.id)?
        }
        None => db.list_expenses()?,
    };

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    let names: HashMap<i64, String> = db
        .list_centres()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("🧾 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");
    for e in &expenses {
        let centre = names.get(&e.centre_id).map(String::as_str).unwrap_or("N/A");
        println!(
            "   {:>5}  {}  {:<16} {:>10.2}  {} ({})",
            e.id, e.date, centre, e.amount, e.description, e.created_by
        );
    }
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} expenses, total {:.2}", expenses.len(), total);

    Ok(())
}

pub fn cmd_expenses_add(
    db: &Database,
    caller: &Caller,
    centre: &str,
    date: &str,
    amount: f64,
    description: &str,
) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("Invalid --date format (use YYYY-MM-DD)")?;
    let centre = resolve_centre(db, centre)?;

    let expense = NewExpense {
        date,
        amount,
        description: description.to_string(),
        centre_id: centre.id,
    };
    let id = create_expense_as(db, caller, &expense)?;
    db.log_audit(&caller.username, "create", Some("expense"), Some(id), None)?;

    println!(
        "✅ Logged {:.2} on {} for {} (id: {})",
        amount, date, centre.name, id
    );
    Ok(())
}

pub fn cmd_expenses_edit(
    db: &Database,
    caller: &Caller,
    id: i64,
    centre: Option<&str>,
    date: Option<&str>,
    amount: Option<f64>,
    description: Option<&str>,
) -> Result<()> {
    let current = db
        .get_expense(id)?
        .with_context(|| format!("Expense not found: {}", id))?;
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => current.date,
    };
    let centre_id = match centre {
        Some(arg) => resolve_centre(db, arg)?.id,
        None => current.centre_id,
    };

    let expense = NewExpense {
        date,
        amount: amount.unwrap_or(current.amount),
        description: description.unwrap_or(&current.description).to_string(),
        centre_id,
    };
    update_expense_as(db, caller, id, &expense)?;
    db.log_audit(&caller.username, "update", Some("expense"), Some(id), None)?;

    println!("✅ Updated expense {}", id);
    Ok(())
}

pub fn cmd_expenses_remove(db: &Database, caller: &Caller, id: i64) -> Result<()> {
    delete_expense_as(db, caller, id)?;
    db.log_audit(&caller.username, "delete", Some("expense"), Some(id), None)?;

    println!("✅ Removed expense {}", id);
    Ok(())
}

pub fn cmd_expenses_import(db: &Database, caller: &Caller, file: &Path) -> Result<()> {
    require(caller, Action::LogExpense)?;
    println!("📥 Importing expenses from {}...", file.display());

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let rows = parse_expense_csv(reader).context("Failed to parse expense CSV")?;
    println!("   Parsed {} rows", rows.len());

    let summary = import_expenses(db, &rows, &caller.username)?;
    db.log_audit(
        &caller.username,
        "import",
        Some("expense"),
        None,
        Some(&format!(
            "imported={} duplicates={}",
            summary.imported, summary.duplicates
        )),
    )?;

    println!("✅ Import complete!");
    println!("   Imported:   {}", summary.imported);
    println!("   Duplicates: {}", summary.duplicates);
    if summary.skipped > 0 {
        println!(
            "   ⚠️  Skipped {} rows for unknown centres: {}",
            summary.skipped,
            summary.unknown_centres.join(", ")
        );
    }

    Ok(())
}
