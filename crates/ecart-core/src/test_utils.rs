//! Test utilities for ecart-core
//!
//! Record builders for pure report tests and a seeded in-memory store for
//! handler tests in downstream crates.

use chrono::NaiveDate;

use crate::models::{Budget, Centre, Expense, NewBudget, NewCentre, NewExpense, NewResponsable};
use crate::store::{BudgetStore, CentreStore, ExpenseStore, MemoryStore, ResponsableStore};

/// Parse a YYYY-MM-DD literal
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

pub fn centre(id: i64, name: &str) -> Centre {
    Centre {
        id,
        name: name.to_string(),
        responsable_id: Some(1),
    }
}

pub fn budget(id: i64, centre_id: i64, quarter: u32, year: i32, amount: f64) -> Budget {
    Budget {
        id,
        centre_id,
        quarter,
        year,
        amount,
    }
}

/// Expense described as "Expense {id}", authored by "assistant"
pub fn expense(id: i64, day: &str, amount: f64, centre_id: i64) -> Expense {
    Expense {
        id,
        date: date(day),
        amount,
        description: format!("Expense {}", id),
        centre_id,
        created_by: "assistant".to_string(),
    }
}

pub fn new_expense(day: &str, amount: f64, description: &str, centre_id: i64) -> NewExpense {
    NewExpense {
        date: date(day),
        amount,
        description: description.to_string(),
        centre_id,
    }
}

/// Ids of the records created by [`seeded_store`]
#[derive(Debug, Clone, Copy)]
pub struct SeededIds {
    pub finance: i64,
    pub it: i64,
    pub sales: i64,
}

/// Store with Finance, IT and Sales centres, Q1/Q2 2024 budgets and expenses
///
/// Finance: budget 1000 in 2024 Q1 against 1200 spent (overrun), 500 spent in Q2.
/// IT: budget 800 in 2024 Q1 against 600 spent (saving).
/// Sales: budget 0 in 2024 Q1 against 300 spent (guarded rate).
pub fn seeded_store() -> (MemoryStore, SeededIds) {
    let store = MemoryStore::new();
    let responsable = store
        .create_responsable(&NewResponsable {
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
        })
        .unwrap();

    let make_centre = |name: &str| {
        store
            .create_centre(&NewCentre {
                name: name.to_string(),
                responsable_id: responsable,
            })
            .unwrap()
    };
    let ids = SeededIds {
        finance: make_centre("Finance"),
        it: make_centre("IT"),
        sales: make_centre("Sales"),
    };

    for (centre_id, amount) in [(ids.finance, 1000.0), (ids.it, 800.0), (ids.sales, 0.0)] {
        store
            .create_budget(&NewBudget {
                centre_id,
                quarter: 1,
                year: 2024,
                amount,
            })
            .unwrap();
    }

    let expenses = [
        ("2024-01-10", 700.0, "Audit fees", ids.finance),
        ("2024-02-15", 500.0, "Software licences", ids.finance),
        ("2024-05-02", 500.0, "Training", ids.finance),
        ("2024-03-01", 600.0, "Laptops", ids.it),
        ("2024-03-20", 300.0, "Trade show", ids.sales),
    ];
    for (day, amount, description, centre_id) in expenses {
        store
            .create_expense(&new_expense(day, amount, description, centre_id), "assistant")
            .unwrap();
    }

    (store, ids)
}
