//! Store interfaces consumed by the reporting core
//!
//! Each record type has its own trait exposing read-all, read-by-id, create,
//! update and delete. Handlers receive an `Arc<dyn Store>` so the SQLite
//! [`Database`](crate::db::Database) can be swapped for the in-memory
//! [`MemoryStore`](memory::MemoryStore) in tests.
//!
//! `update_*` and `delete_*` return `false` when no record has the given id.

use crate::error::Result;
use crate::models::{
    AuditEntry, Budget, Centre, Expense, NewBudget, NewCentre, NewExpense, NewResponsable,
    Responsable, Role, User,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

pub trait UserStore: Send + Sync {
    fn list_users(&self) -> Result<Vec<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Fails with `InvalidData` if the username is taken
    fn create_user(&self, username: &str, role: Role) -> Result<i64>;
    fn set_user_role(&self, id: i64, role: Role) -> Result<bool>;
    fn delete_user(&self, id: i64) -> Result<bool>;
}

pub trait ResponsableStore: Send + Sync {
    fn list_responsables(&self) -> Result<Vec<Responsable>>;
    fn get_responsable(&self, id: i64) -> Result<Option<Responsable>>;
    fn create_responsable(&self, responsable: &NewResponsable) -> Result<i64>;
    fn update_responsable(&self, id: i64, responsable: &NewResponsable) -> Result<bool>;
    fn delete_responsable(&self, id: i64) -> Result<bool>;
}

pub trait CentreStore: Send + Sync {
    fn list_centres(&self) -> Result<Vec<Centre>>;
    fn get_centre(&self, id: i64) -> Result<Option<Centre>>;
    fn create_centre(&self, centre: &NewCentre) -> Result<i64>;
    fn update_centre(&self, id: i64, centre: &NewCentre) -> Result<bool>;
    fn delete_centre(&self, id: i64) -> Result<bool>;

    /// First centre with exactly this name
    fn find_centre_by_name(&self, name: &str) -> Result<Option<Centre>> {
        Ok(self.list_centres()?.into_iter().find(|c| c.name == name))
    }
}

pub trait BudgetStore: Send + Sync {
    /// All budgets in insertion order
    fn list_budgets(&self) -> Result<Vec<Budget>>;
    fn get_budget(&self, id: i64) -> Result<Option<Budget>>;
    fn create_budget(&self, budget: &NewBudget) -> Result<i64>;
    fn update_budget(&self, id: i64, budget: &NewBudget) -> Result<bool>;
    fn delete_budget(&self, id: i64) -> Result<bool>;
}

pub trait ExpenseStore: Send + Sync {
    /// All expenses in insertion order
    fn list_expenses(&self) -> Result<Vec<Expense>>;
    fn list_expenses_for_centre(&self, centre_id: i64) -> Result<Vec<Expense>>;
    fn get_expense(&self, id: i64) -> Result<Option<Expense>>;
    fn create_expense(&self, expense: &NewExpense, author: &str) -> Result<i64>;
    /// Insert unless an expense with the same import hash exists (returns None then)
    fn import_expense(
        &self,
        expense: &NewExpense,
        author: &str,
        import_hash: &str,
    ) -> Result<Option<i64>>;
    fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<bool>;
    fn delete_expense(&self, id: i64) -> Result<bool>;
}

pub trait AuditLog: Send + Sync {
    fn log_audit(
        &self,
        username: &str,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<i64>;

    /// Most recent entries first
    fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>>;
}

/// Everything the server and CLI need from persistence
pub trait Store:
    UserStore + ResponsableStore + CentreStore + BudgetStore + ExpenseStore + AuditLog
{
}

impl<T> Store for T where
    T: UserStore + ResponsableStore + CentreStore + BudgetStore + ExpenseStore + AuditLog
{
}
