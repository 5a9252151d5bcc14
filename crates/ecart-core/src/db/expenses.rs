//! Expense operations

use rusqlite::{params, OptionalExtension};

use super::{date_column, Database};
use crate::error::Result;
use crate::models::{Expense, NewExpense};
use crate::store::ExpenseStore;

const EXPENSE_COLUMNS: &str = "id, date, amount, description, centre_id, created_by";

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        date: date_column(row, 1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        centre_id: row.get(4)?,
        created_by: row.get(5)?,
    })
}

impl Database {
    fn query_expenses(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses {} ORDER BY id",
            EXPENSE_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params, row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }
}

impl ExpenseStore for Database {
    fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.query_expenses("", [])
    }

    fn list_expenses_for_centre(&self, centre_id: i64) -> Result<Vec<Expense>> {
        self.query_expenses("WHERE centre_id = ?", params![centre_id])
    }

    fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
                params![id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    fn create_expense(&self, expense: &NewExpense, author: &str) -> Result<i64> {
        expense.validate()?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (date, amount, description, centre_id, created_by)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                expense.date.to_string(),
                expense.amount,
                expense.description,
                expense.centre_id,
                author
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn import_expense(
        &self,
        expense: &NewExpense,
        author: &str,
        import_hash: &str,
    ) -> Result<Option<i64>> {
        expense.validate()?;
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM expenses WHERE import_hash = ?",
                params![import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None);
        }

        conn.execute(
            r#"
            INSERT INTO expenses (date, amount, description, centre_id, created_by, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                expense.date.to_string(),
                expense.amount,
                expense.description,
                expense.centre_id,
                author,
                import_hash
            ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
    }

    fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<bool> {
        expense.validate()?;
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE expenses SET date = ?, amount = ?, description = ?, centre_id = ?
            WHERE id = ?
            "#,
            params![
                expense.date.to_string(),
                expense.amount,
                expense.description,
                expense.centre_id,
                id
            ],
        )?;
        Ok(updated > 0)
    }

    fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
