//! Role-based authorization
//!
//! [`authorize`] is a pure predicate over the caller, the requested action
//! and (for expenses) the record's author. Callers evaluate it before
//! touching the store; the `*_as` helpers bundle that check with the
//! expense operations that depend on authorship.

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{NewExpense, Role};
use crate::store::ExpenseStore;

/// Message returned when an admin-only action is refused
pub const ADMINS_ONLY: &str = "Admins only!";

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Admin identity used when authentication is disabled
    pub fn local_admin() -> Self {
        Self::new("local-dev", Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// What the caller wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read any record or report
    Read,
    /// Log a new expense
    LogExpense,
    /// Edit or delete an existing expense
    ModifyExpense,
    /// Manage users, centres, responsables and budgets
    Administer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Decide whether `caller` may perform `action`
///
/// `owner` is the author of the targeted expense for [`Action::ModifyExpense`]
/// and ignored otherwise.
pub fn authorize(caller: &Caller, action: Action, owner: Option<&str>) -> Access {
    let allowed = match action {
        Action::Read | Action::LogExpense => true,
        Action::ModifyExpense => caller.is_admin() || owner == Some(caller.username.as_str()),
        Action::Administer => caller.is_admin(),
    };

    if allowed {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// [`authorize`] as a `Result`, for actions without an owner
pub fn require(caller: &Caller, action: Action) -> Result<()> {
    match authorize(caller, action, None) {
        Access::Allow => Ok(()),
        Access::Deny => {
            warn!(user = %caller.username, ?action, "Permission denied");
            Err(Error::PermissionDenied(ADMINS_ONLY.to_string()))
        }
    }
}

/// Log an expense authored by the caller
pub fn create_expense_as(
    store: &dyn ExpenseStore,
    caller: &Caller,
    expense: &NewExpense,
) -> Result<i64> {
    require(caller, Action::LogExpense)?;
    expense.validate()?;
    store.create_expense(expense, &caller.username)
}

/// Replace an expense; only its author or an admin may do so
pub fn update_expense_as(
    store: &dyn ExpenseStore,
    caller: &Caller,
    id: i64,
    expense: &NewExpense,
) -> Result<()> {
    check_expense_owner(store, caller, id, "edit")?;
    expense.validate()?;
    store.update_expense(id, expense)?;
    Ok(())
}

/// Delete an expense; only its author or an admin may do so
pub fn delete_expense_as(store: &dyn ExpenseStore, caller: &Caller, id: i64) -> Result<()> {
    check_expense_owner(store, caller, id, "delete")?;
    store.delete_expense(id)?;
    Ok(())
}

fn check_expense_owner(
    store: &dyn ExpenseStore,
    caller: &Caller,
    id: i64,
    verb: &str,
) -> Result<()> {
    let expense = store
        .get_expense(id)?
        .ok_or_else(|| Error::NotFound("Depense not found".to_string()))?;

    match authorize(caller, Action::ModifyExpense, Some(&expense.created_by)) {
        Access::Allow => Ok(()),
        Access::Deny => {
            warn!(user = %caller.username, expense_id = id, owner = %expense.created_by, "Expense {} denied", verb);
            Err(Error::PermissionDenied(format!(
                "Permission denied: You can only {} your own expenses.",
                verb
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::new_expense;

    fn admin() -> Caller {
        Caller::new("root", Role::Admin)
    }

    fn assistant(name: &str) -> Caller {
        Caller::new(name, Role::Assistant)
    }

    #[test]
    fn test_read_and_log_open_to_everyone() {
        for caller in [admin(), assistant("amina")] {
            assert_eq!(authorize(&caller, Action::Read, None), Access::Allow);
            assert_eq!(authorize(&caller, Action::LogExpense, None), Access::Allow);
        }
    }

    #[test]
    fn test_administer_admin_only() {
        assert_eq!(authorize(&admin(), Action::Administer, None), Access::Allow);
        assert_eq!(
            authorize(&assistant("amina"), Action::Administer, None),
            Access::Deny
        );
        let err = require(&assistant("amina"), Action::Administer).unwrap_err();
        assert_eq!(err.to_string(), ADMINS_ONLY);
    }

    #[test]
    fn test_modify_expense_owner_or_admin() {
        let amina = assistant("amina");
        assert_eq!(
            authorize(&amina, Action::ModifyExpense, Some("amina")),
            Access::Allow
        );
        assert_eq!(
            authorize(&amina, Action::ModifyExpense, Some("youssef")),
            Access::Deny
        );
        assert_eq!(authorize(&amina, Action::ModifyExpense, None), Access::Deny);
        assert_eq!(
            authorize(&admin(), Action::ModifyExpense, Some("youssef")),
            Access::Allow
        );
    }

    #[test]
    fn test_create_expense_records_author() {
        let store = MemoryStore::new();
        let id = create_expense_as(
            &store,
            &assistant("amina"),
            &new_expense("2024-01-02", 40.0, "Toner", 1),
        )
        .unwrap();
        assert_eq!(store.get_expense(id).unwrap().unwrap().created_by, "amina");
    }

    #[test]
    fn test_update_expense_by_other_assistant_denied() {
        let store = MemoryStore::new();
        let id = store
            .create_expense(&new_expense("2024-01-02", 40.0, "Toner", 1), "amina")
            .unwrap();

        let err = update_expense_as(
            &store,
            &assistant("youssef"),
            id,
            &new_expense("2024-01-02", 99.0, "Toner", 1),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Permission denied: You can only edit your own expenses."
        );
        assert_eq!(store.get_expense(id).unwrap().unwrap().amount, 40.0);
    }

    #[test]
    fn test_update_expense_by_author_and_admin() {
        let store = MemoryStore::new();
        let id = store
            .create_expense(&new_expense("2024-01-02", 40.0, "Toner", 1), "amina")
            .unwrap();

        update_expense_as(
            &store,
            &assistant("amina"),
            id,
            &new_expense("2024-01-03", 45.0, "Toner", 1),
        )
        .unwrap();
        update_expense_as(
            &store,
            &admin(),
            id,
            &new_expense("2024-01-03", 50.0, "Toner x2", 1),
        )
        .unwrap();

        let expense = store.get_expense(id).unwrap().unwrap();
        assert_eq!(expense.amount, 50.0);
        // Authorship does not move to the editor
        assert_eq!(expense.created_by, "amina");
    }

    #[test]
    fn test_delete_expense_rules() {
        let store = MemoryStore::new();
        let id = store
            .create_expense(&new_expense("2024-01-02", 40.0, "Toner", 1), "amina")
            .unwrap();

        let err = delete_expense_as(&store, &assistant("youssef"), id).unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
        assert!(err.to_string().contains("delete your own expenses"));

        delete_expense_as(&store, &assistant("amina"), id).unwrap();
        assert!(store.get_expense(id).unwrap().is_none());

        let err = delete_expense_as(&store, &admin(), id).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_update_rejects_invalid_input() {
        let store = MemoryStore::new();
        let id = store
            .create_expense(&new_expense("2024-01-02", 40.0, "Toner", 1), "amina")
            .unwrap();
        let err = update_expense_as(
            &store,
            &assistant("amina"),
            id,
            &new_expense("2024-01-02", 0.0, "Toner", 1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
