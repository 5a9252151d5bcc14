//! Integration tests for ecart-core
//!
//! These tests exercise the full CSV import → SQLite → report → workbook
//! workflow against a real database.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use ecart_core::{
    db::Database,
    export_workbook, import_expenses,
    models::{NewBudget, NewCentre, NewResponsable},
    parse_expense_csv, predict_centre_total,
    spreadsheet::{LEDGER_SHEET, VARIANCE_SHEET},
    variance_report, BudgetStore, CentreStore, ForecastOutcome, Interpretation, ReportConfig,
    ResponsableStore,
};

fn expenses_csv() -> &'static str {
    r#"date,amount,description,centre
2023-01-15,100,Office supplies,Finance
2023-04-10,120,Office supplies,Finance
2023-05-20,80,Courier,Finance
2023-02-03,450,Laptop,IT
2023-02-28,50,Cables,IT
2023-03-14,300,Trade show,Sales
"#
}

/// Finance, IT and Sales centres with 2023 Q1/Q2 budgets
fn seeded_database() -> (Database, i64, i64) {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let responsable = db
        .create_responsable(&NewResponsable {
            nom: "Alaoui".to_string(),
            prenom: "Sara".to_string(),
        })
        .unwrap();

    let mut ids = Vec::new();
    for name in ["Finance", "IT", "Sales"] {
        ids.push(
            db.create_centre(&NewCentre {
                name: name.to_string(),
                responsable_id: responsable,
            })
            .unwrap(),
        );
    }

    let budgets = [
        (ids[0], 1, 150.0),
        (ids[0], 2, 200.0),
        (ids[1], 1, 400.0),
        (ids[2], 1, 0.0),
    ];
    for (centre_id, quarter, amount) in budgets {
        db.create_budget(&NewBudget {
            centre_id,
            quarter,
            year: 2023,
            amount,
        })
        .unwrap();
    }

    (db, ids[0], ids[1])
}

#[test]
fn test_import_then_variance_report() {
    let (db, _, _) = seeded_database();
    let rows = parse_expense_csv(expenses_csv().as_bytes()).unwrap();
    let summary = import_expenses(&db, &rows, "amina").unwrap();
    assert_eq!(summary.imported, 6);

    let report = variance_report(&db, &ReportConfig::default()).unwrap();
    assert_eq!(report.analysis.len(), 4);

    let finance_q1 = &report.analysis[0];
    assert_eq!(finance_q1.centre, "Finance");
    assert_eq!(finance_q1.actual_amount, 100.0);
    assert_eq!(finance_q1.deviation, -50.0);
    assert!((finance_q1.deviation_rate - -33.333333).abs() < 1e-4);
    assert_eq!(finance_q1.interpretation, Interpretation::Saving);

    let finance_q2 = &report.analysis[1];
    assert_eq!(finance_q2.actual_amount, 200.0);
    assert_eq!(finance_q2.interpretation, Interpretation::Neutral);

    let it_q1 = &report.analysis[2];
    assert_eq!(it_q1.actual_amount, 500.0);
    assert_eq!(it_q1.deviation_rate, 25.0);
    assert_eq!(it_q1.interpretation, Interpretation::Overrun);

    let sales_q1 = &report.analysis[3];
    assert_eq!(sales_q1.actual_amount, 300.0);
    assert_eq!(sales_q1.deviation_rate, 0.0);
    assert_eq!(sales_q1.interpretation, Interpretation::Neutral);

    // Finance (3) + IT (2); Sales is not designated
    assert_eq!(report.ledger.len(), 5);
    assert!(report.ledger.iter().all(|r| r.centre != "Sales"));
    assert_eq!(report.ledger[0].date, "2023-01-15");
}

#[test]
fn test_reimport_is_idempotent() {
    let (db, _, _) = seeded_database();
    let rows = parse_expense_csv(expenses_csv().as_bytes()).unwrap();
    import_expenses(&db, &rows, "amina").unwrap();
    let again = import_expenses(&db, &rows, "youssef").unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.duplicates, 6);

    let report = variance_report(&db, &ReportConfig::default()).unwrap();
    assert_eq!(report.analysis[2].actual_amount, 500.0);
}

#[test]
fn test_export_workbook_round_trip() {
    let (db, _, _) = seeded_database();
    let rows = parse_expense_csv(expenses_csv().as_bytes()).unwrap();
    import_expenses(&db, &rows, "amina").unwrap();

    let bytes = export_workbook(&db, &ReportConfig::default()).unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![VARIANCE_SHEET.to_string(), LEDGER_SHEET.to_string()]
    );

    let analysis = workbook.worksheet_range(VARIANCE_SHEET).unwrap();
    assert_eq!(analysis.height(), 5);
    let rows: Vec<_> = analysis.rows().collect();
    assert_eq!(rows[0][0], Data::String("Centre".to_string()));
    assert_eq!(rows[0][7], Data::String("Interpretation".to_string()));
    assert_eq!(rows[3][0], Data::String("IT".to_string()));
    assert_eq!(rows[3][5], Data::Float(100.0));
    assert_eq!(rows[3][7], Data::String("overrun".to_string()));

    let ledger = workbook.worksheet_range(LEDGER_SHEET).unwrap();
    assert_eq!(ledger.height(), 6);
    let rows: Vec<_> = ledger.rows().collect();
    assert_eq!(rows[0][3], Data::String("Expense Date".to_string()));
    assert_eq!(rows[1][1], Data::String("Finance".to_string()));
    assert_eq!(rows[1][4], Data::Float(100.0));
}

#[test]
fn test_export_with_empty_database() {
    let db = Database::in_memory().unwrap();
    let bytes = export_workbook(&db, &ReportConfig::default()).unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names().len(), 2);
    assert_eq!(workbook.worksheet_range(VARIANCE_SHEET).unwrap().height(), 1);
    assert_eq!(workbook.worksheet_range(LEDGER_SHEET).unwrap().height(), 1);
}

#[test]
fn test_forecast_from_database() {
    let (db, finance, it) = seeded_database();
    let rows = parse_expense_csv(expenses_csv().as_bytes()).unwrap();
    import_expenses(&db, &rows, "amina").unwrap();

    // Finance: Q1 = 100, Q2 = 200 → Q3 = 300
    match predict_centre_total(&db, finance, 2023, 3).unwrap() {
        ForecastOutcome::Predicted(forecast) => {
            assert!((forecast.predicted_total - 300.0).abs() < 1e-6);
            assert!((forecast.r2_score - 1.0).abs() < 1e-9);
        }
        other => panic!("expected a prediction, got {:?}", other),
    }

    // IT only has Q1 history
    assert_eq!(
        predict_centre_total(&db, it, 2023, 3).unwrap(),
        ForecastOutcome::InsufficientData { buckets: 1 }
    );

    assert_eq!(
        predict_centre_total(&db, 424242, 2023, 3).unwrap(),
        ForecastOutcome::NoHistory
    );

    assert_eq!(db.list_centres().unwrap().len(), 3);
    assert_eq!(db.list_budgets().unwrap().len(), 4);
}
