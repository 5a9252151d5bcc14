//! In-memory store for tests

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{AuditLog, BudgetStore, CentreStore, ExpenseStore, ResponsableStore, UserStore};
use crate::error::{Error, Result};
use crate::models::{
    AuditEntry, Budget, Centre, Expense, NewBudget, NewCentre, NewExpense, NewResponsable,
    Responsable, Role, User,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
    responsables: Vec<Responsable>,
    centres: Vec<Centre>,
    budgets: Vec<Budget>,
    expenses: Vec<(Expense, Option<String>)>,
    audit: Vec<AuditEntry>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vec-backed store; ids are shared across record types and start at 1
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test must not poison the store for the assertions that follow
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl UserStore for MemoryStore {
    fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.lock().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn create_user(&self, username: &str, role: Role) -> Result<i64> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.username == username) {
            return Err(Error::InvalidData(format!(
                "Username already exists: {}",
                username
            )));
        }
        let id = inner.next_id();
        inner.users.push(User {
            id,
            username: username.to_string(),
            role,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn set_user_role(&self, id: i64, role: Role) -> Result<bool> {
        let mut inner = self.lock();
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() != before)
    }
}

impl ResponsableStore for MemoryStore {
    fn list_responsables(&self) -> Result<Vec<Responsable>> {
        Ok(self.lock().responsables.clone())
    }

    fn get_responsable(&self, id: i64) -> Result<Option<Responsable>> {
        Ok(self
            .lock()
            .responsables
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    fn create_responsable(&self, responsable: &NewResponsable) -> Result<i64> {
        responsable.validate()?;
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.responsables.push(Responsable {
            id,
            nom: responsable.nom.clone(),
            prenom: responsable.prenom.clone(),
        });
        Ok(id)
    }

    fn update_responsable(&self, id: i64, responsable: &NewResponsable) -> Result<bool> {
        responsable.validate()?;
        let mut inner = self.lock();
        match inner.responsables.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                existing.nom = responsable.nom.clone();
                existing.prenom = responsable.prenom.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_responsable(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.responsables.len();
        inner.responsables.retain(|r| r.id != id);
        let removed = inner.responsables.len() != before;
        if removed {
            for centre in inner.centres.iter_mut() {
                if centre.responsable_id == Some(id) {
                    centre.responsable_id = None;
                }
            }
        }
        Ok(removed)
    }
}

impl CentreStore for MemoryStore {
    fn list_centres(&self) -> Result<Vec<Centre>> {
        Ok(self.lock().centres.clone())
    }

    fn get_centre(&self, id: i64) -> Result<Option<Centre>> {
        Ok(self.lock().centres.iter().find(|c| c.id == id).cloned())
    }

    fn create_centre(&self, centre: &NewCentre) -> Result<i64> {
        centre.validate()?;
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.centres.push(Centre {
            id,
            name: centre.name.clone(),
            responsable_id: Some(centre.responsable_id),
        });
        Ok(id)
    }

    fn update_centre(&self, id: i64, centre: &NewCentre) -> Result<bool> {
        centre.validate()?;
        let mut inner = self.lock();
        match inner.centres.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.name = centre.name.clone();
                existing.responsable_id = Some(centre.responsable_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_centre(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.centres.len();
        inner.centres.retain(|c| c.id != id);
        Ok(inner.centres.len() != before)
    }
}

impl BudgetStore for MemoryStore {
    fn list_budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.lock().budgets.clone())
    }

    fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        Ok(self.lock().budgets.iter().find(|b| b.id == id).cloned())
    }

    fn create_budget(&self, budget: &NewBudget) -> Result<i64> {
        budget.validate()?;
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.budgets.push(Budget {
            id,
            centre_id: budget.centre_id,
            quarter: budget.quarter,
            year: budget.year,
            amount: budget.amount,
        });
        Ok(id)
    }

    fn update_budget(&self, id: i64, budget: &NewBudget) -> Result<bool> {
        budget.validate()?;
        let mut inner = self.lock();
        match inner.budgets.iter_mut().find(|b| b.id == id) {
            Some(existing) => {
                existing.centre_id = budget.centre_id;
                existing.quarter = budget.quarter;
                existing.year = budget.year;
                existing.amount = budget.amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_budget(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.budgets.len();
        inner.budgets.retain(|b| b.id != id);
        Ok(inner.budgets.len() != before)
    }
}

impl ExpenseStore for MemoryStore {
    fn list_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.lock().expenses.iter().map(|(e, _)| e.clone()).collect())
    }

    fn list_expenses_for_centre(&self, centre_id: i64) -> Result<Vec<Expense>> {
        Ok(self
            .lock()
            .expenses
            .iter()
            .filter(|(e, _)| e.centre_id == centre_id)
            .map(|(e, _)| e.clone())
            .collect())
    }

    fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .lock()
            .expenses
            .iter()
            .find(|(e, _)| e.id == id)
            .map(|(e, _)| e.clone()))
    }

    fn create_expense(&self, expense: &NewExpense, author: &str) -> Result<i64> {
        expense.validate()?;
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.expenses.push((build_expense(id, expense, author), None));
        Ok(id)
    }

    fn import_expense(
        &self,
        expense: &NewExpense,
        author: &str,
        import_hash: &str,
    ) -> Result<Option<i64>> {
        expense.validate()?;
        let mut inner = self.lock();
        if inner
            .expenses
            .iter()
            .any(|(_, hash)| hash.as_deref() == Some(import_hash))
        {
            return Ok(None);
        }
        let id = inner.next_id();
        inner.expenses.push((
            build_expense(id, expense, author),
            Some(import_hash.to_string()),
        ));
        Ok(Some(id))
    }

    fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<bool> {
        expense.validate()?;
        let mut inner = self.lock();
        match inner.expenses.iter_mut().find(|(e, _)| e.id == id) {
            Some((existing, _)) => {
                existing.date = expense.date;
                existing.amount = expense.amount;
                existing.description = expense.description.clone();
                existing.centre_id = expense.centre_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_expense(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.expenses.len();
        inner.expenses.retain(|(e, _)| e.id != id);
        Ok(inner.expenses.len() != before)
    }
}

impl AuditLog for MemoryStore {
    fn log_audit(
        &self,
        username: &str,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<i64> {
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.audit.push(AuditEntry {
            id,
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            username: username.to_string(),
            action: action.to_string(),
            entity_type: entity_type.map(str::to_string),
            entity_id,
            details: details.map(str::to_string),
        });
        Ok(id)
    }

    fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let inner = self.lock();
        Ok(inner
            .audit
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

fn build_expense(id: i64, expense: &NewExpense, author: &str) -> Expense {
    Expense {
        id,
        date: expense.date,
        amount: expense.amount,
        description: expense.description.clone(),
        centre_id: expense.centre_id,
        created_by: author.to_string(),
    }
}
