//! Database tests

use super::*;
use crate::models::*;
use crate::store::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, new_expense};

    fn responsable(db: &Database) -> i64 {
        db.create_responsable(&NewResponsable {
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
        })
        .unwrap()
    }

    fn centre(db: &Database, name: &str, responsable_id: i64) -> i64 {
        db.create_centre(&NewCentre {
            name: name.to_string(),
            responsable_id,
        })
        .unwrap()
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_centres().unwrap().is_empty());
        assert!(db.list_expenses().unwrap().is_empty());
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_migrations_idempotent() {
        let db = Database::in_memory().unwrap();
        let path = db.path().to_string();
        responsable(&db);
        drop(db);

        let reopened = Database::new_unencrypted(&path).unwrap();
        assert_eq!(reopened.list_responsables().unwrap().len(), 1);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let a = derive_key("passphrase").unwrap();
        let b = derive_key("passphrase").unwrap();
        let c = derive_key("other").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        let id = db.create_user("youssef", Role::Assistant).unwrap();
        db.create_user("amina", Role::Admin).unwrap();

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "amina");
        assert_eq!(users[0].role, Role::Admin);

        let err = db.create_user("youssef", Role::Admin).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        assert!(db.set_user_role(id, Role::Admin).unwrap());
        let user = db.get_user_by_username("youssef").unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);

        assert!(db.delete_user(id).unwrap());
        assert!(!db.delete_user(id).unwrap());
        assert!(db.get_user_by_username("youssef").unwrap().is_none());
    }

    #[test]
    fn test_responsable_crud() {
        let db = Database::in_memory().unwrap();
        let id = responsable(&db);

        let err = db
            .create_responsable(&NewResponsable {
                nom: "".to_string(),
                prenom: "Sara".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        assert!(db
            .update_responsable(
                id,
                &NewResponsable {
                    nom: "Bennani".to_string(),
                    prenom: "Sara".to_string(),
                }
            )
            .unwrap());
        let fetched = db.get_responsable(id).unwrap().unwrap();
        assert_eq!(fetched.full_name(), "Sara Bennani");
        assert!(!db
            .update_responsable(
                999,
                &NewResponsable {
                    nom: "X".to_string(),
                    prenom: "Y".to_string(),
                }
            )
            .unwrap());
    }

    #[test]
    fn test_centre_requires_existing_responsable() {
        let db = Database::in_memory().unwrap();
        let err = db
            .create_centre(&NewCentre {
                name: "Finance".to_string(),
                responsable_id: 42,
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_centre_crud_and_lookup() {
        let db = Database::in_memory().unwrap();
        let r = responsable(&db);
        let finance = centre(&db, "Finance", r);
        let it = centre(&db, "IT", r);

        assert_eq!(db.list_centres().unwrap().len(), 2);
        assert_eq!(db.find_centre_by_name("IT").unwrap().unwrap().id, it);
        assert!(db.find_centre_by_name("it").unwrap().is_none());

        assert!(db
            .update_centre(
                finance,
                &NewCentre {
                    name: "Finance & Audit".to_string(),
                    responsable_id: r,
                }
            )
            .unwrap());
        assert_eq!(
            db.get_centre(finance).unwrap().unwrap().name,
            "Finance & Audit"
        );

        assert!(db.delete_centre(it).unwrap());
        assert!(db.get_centre(it).unwrap().is_none());
    }

    #[test]
    fn test_delete_responsable_orphans_centres() {
        let db = Database::in_memory().unwrap();
        let r = responsable(&db);
        let finance = centre(&db, "Finance", r);

        assert!(db.delete_responsable(r).unwrap());
        let c = db.get_centre(finance).unwrap().unwrap();
        assert_eq!(c.responsable_id, None);
    }

    #[test]
    fn test_budget_crud() {
        let db = Database::in_memory().unwrap();
        let budget = NewBudget {
            centre_id: 1,
            quarter: 2,
            year: 2024,
            amount: 1500.0,
        };
        let id = db.create_budget(&budget).unwrap();
        // Duplicates for the same period are allowed
        db.create_budget(&budget).unwrap();
        assert_eq!(db.list_budgets().unwrap().len(), 2);

        let fetched = db.get_budget(id).unwrap().unwrap();
        assert_eq!(fetched.quarter, 2);
        assert_eq!(fetched.year, 2024);
        assert_eq!(fetched.amount, 1500.0);

        let err = db
            .create_budget(&NewBudget {
                quarter: 5,
                ..budget.clone()
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        assert!(db
            .update_budget(
                id,
                &NewBudget {
                    amount: 0.0,
                    ..budget
                }
            )
            .unwrap());
        assert_eq!(db.get_budget(id).unwrap().unwrap().amount, 0.0);
        assert!(db.delete_budget(id).unwrap());
        assert_eq!(db.list_budgets().unwrap().len(), 1);
    }

    #[test]
    fn test_quarter_check_constraint() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();
        let result = conn.execute(
            "INSERT INTO budgets (centre_id, quarter, year, amount) VALUES (1, 0, 2024, 10.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expense_crud() {
        let db = Database::in_memory().unwrap();
        let id = db
            .create_expense(&new_expense("2024-02-29", 120.5, "Taxi", 3), "amina")
            .unwrap();

        let expense = db.get_expense(id).unwrap().unwrap();
        assert_eq!(expense.date, date("2024-02-29"));
        assert_eq!(expense.amount, 120.5);
        assert_eq!(expense.description, "Taxi");
        assert_eq!(expense.centre_id, 3);
        assert_eq!(expense.created_by, "amina");

        db.create_expense(&new_expense("2024-03-01", 10.0, "Coffee", 4), "amina")
            .unwrap();
        assert_eq!(db.list_expenses_for_centre(3).unwrap().len(), 1);
        assert_eq!(db.list_expenses().unwrap().len(), 2);

        assert!(db
            .update_expense(id, &new_expense("2024-03-02", 130.0, "Taxi", 3))
            .unwrap());
        let updated = db.get_expense(id).unwrap().unwrap();
        assert_eq!(updated.date, date("2024-03-02"));
        assert_eq!(updated.created_by, "amina");

        let err = db
            .create_expense(&new_expense("2024-03-01", 0.0, "Nothing", 3), "amina")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        assert!(db.delete_expense(id).unwrap());
        assert!(db.get_expense(id).unwrap().is_none());
    }

    #[test]
    fn test_import_expense_dedupes_by_hash() {
        let db = Database::in_memory().unwrap();
        let expense = new_expense("2024-01-10", 700.0, "Audit fees", 1);

        let first = db.import_expense(&expense, "amina", "abc123").unwrap();
        assert!(first.is_some());
        let second = db.import_expense(&expense, "amina", "abc123").unwrap();
        assert!(second.is_none());
        assert_eq!(db.list_expenses().unwrap().len(), 1);

        // Manually created expenses never collide with imports
        db.create_expense(&expense, "amina").unwrap();
        db.create_expense(&expense, "amina").unwrap();
        assert_eq!(db.list_expenses().unwrap().len(), 3);
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        db.log_audit("amina", "predict", Some("centre"), Some(1), Some("2024 Q3"))
            .unwrap();
        db.log_audit("api-key", "export", None, None, None).unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "export");
        assert_eq!(entries[1].username, "amina");
        assert_eq!(entries[1].entity_type.as_deref(), Some("centre"));
        assert_eq!(entries[1].details.as_deref(), Some("2024 Q3"));

        assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
    }
}
