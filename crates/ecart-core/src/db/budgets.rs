//! Budget operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{Budget, NewBudget};
use crate::store::BudgetStore;

fn row_to_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        centre_id: row.get(1)?,
        quarter: row.get(2)?,
        year: row.get(3)?,
        amount: row.get(4)?,
    })
}

impl BudgetStore for Database {
    fn list_budgets(&self) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, centre_id, quarter, year, amount FROM budgets ORDER BY id")?;
        let budgets = stmt
            .query_map([], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, centre_id, quarter, year, amount FROM budgets WHERE id = ?",
                params![id],
                row_to_budget,
            )
            .optional()?;
        Ok(budget)
    }

    fn create_budget(&self, budget: &NewBudget) -> Result<i64> {
        budget.validate()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (centre_id, quarter, year, amount) VALUES (?, ?, ?, ?)",
            params![budget.centre_id, budget.quarter, budget.year, budget.amount],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_budget(&self, id: i64, budget: &NewBudget) -> Result<bool> {
        budget.validate()?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE budgets SET centre_id = ?, quarter = ?, year = ?, amount = ? WHERE id = ?",
            params![
                budget.centre_id,
                budget.quarter,
                budget.year,
                budget.amount,
                id
            ],
        )?;
        Ok(updated > 0)
    }

    fn delete_budget(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
