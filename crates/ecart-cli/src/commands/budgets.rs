//! Budget commands

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use ecart_core::db::Database;
use ecart_core::models::NewBudget;
use ecart_core::{require, Action, AuditLog, BudgetStore, Caller, CentreStore};

use super::resolve_centre;

pub fn cmd_budgets_list(db: &Database) -> Result<()> {
    let budgets = db.list_budgets()?;

    if budgets.is_empty() {
        println!("No budgets found.");
        return Ok(());
    }

    let names: HashMap<i64, String> = db
        .list_centres()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────────────");
    for budget in &budgets {
        let centre = names
            .get(&budget.centre_id)
            .map(String::as_str)
            .unwrap_or("N/A");
        println!(
            "   {:>4}  {:<20} {} T{}  {:>12.2}",
            budget.id, centre, budget.year, budget.quarter, budget.amount
        );
    }

    Ok(())
}

pub fn cmd_budgets_add(
    db: &Database,
    caller: &Caller,
    centre: &str,
    quarter: u32,
    year: i32,
    amount: f64,
) -> Result<()> {
    require(caller, Action::Administer)?;

    let centre = resolve_centre(db, centre)?;
    let budget = NewBudget {
        centre_id: centre.id,
        quarter,
        year,
        amount,
    };
    budget.validate()?;
    let id = db.create_budget(&budget)?;
    db.log_audit(&caller.username, "create", Some("budget"), Some(id), None)?;

    println!(
        "✅ Budget {:.2} for {} {} T{} (id: {})",
        amount, centre.name, year, quarter, id
    );
    Ok(())
}

pub fn cmd_budgets_edit(
    db: &Database,
    caller: &Caller,
    id: i64,
    centre: Option<&str>,
    quarter: Option<u32>,
    year: Option<i32>,
    amount: Option<f64>,
) -> Result<()> {
    require(caller, Action::Administer)?;

    let current = db
        .get_budget(id)?
        .with_context(|| format!("Budget not found: {}", id))?;
    let centre_id = match centre {
        Some(arg) => resolve_centre(db, arg)?.id,
        None => current.centre_id,
    };
    let budget = NewBudget {
        centre_id,
        quarter: quarter.unwrap_or(current.quarter),
        year: year.unwrap_or(current.year),
        amount: amount.unwrap_or(current.amount),
    };
    budget.validate()?;
    db.update_budget(id, &budget)?;
    db.log_audit(&caller.username, "update", Some("budget"), Some(id), None)?;

    println!(
        "✅ Updated budget {}: {:.2} for {} T{}",
        id, budget.amount, budget.year, budget.quarter
    );
    Ok(())
}

pub fn cmd_budgets_remove(db: &Database, caller: &Caller, id: i64) -> Result<()> {
    require(caller, Action::Administer)?;

    if !db.delete_budget(id)? {
        bail!("Budget not found: {}", id);
    }
    db.log_audit(&caller.username, "delete", Some("budget"), Some(id), None)?;

    println!("✅ Removed budget {}", id);
    Ok(())
}
