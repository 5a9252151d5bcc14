//! Forecast and export commands

use std::path::Path;

use anyhow::{Context, Result};
use ecart_core::db::Database;
use ecart_core::{
    export_workbook, predict_centre_total, AuditLog, Caller, ForecastOutcome, ReportConfig,
};

use super::resolve_centre;

pub fn cmd_forecast(
    db: &Database,
    caller: &Caller,
    centre: &str,
    quarter: u32,
    year: i32,
) -> Result<()> {
    let centre = resolve_centre(db, centre)?;
    let outcome = predict_centre_total(db, centre.id, year, quarter)?;
    db.log_audit(
        &caller.username,
        "predict",
        Some("centre"),
        Some(centre.id),
        Some(&format!("{} T{}", year, quarter)),
    )?;

    println!();
    println!("📈 Forecast for {} - {} T{}", centre.name, year, quarter);
    match outcome {
        ForecastOutcome::Predicted(forecast) => {
            println!("   Predicted total: {:.2}", forecast.predicted_total);
            println!("   R² score:        {:.4}", forecast.r2_score);
        }
        other => {
            if let Some(message) = other.message() {
                println!("   ⚠️  {}", message);
            }
        }
    }

    Ok(())
}

pub fn cmd_export(db: &Database, caller: &Caller, config: &ReportConfig, out: &Path) -> Result<()> {
    println!("📊 Exporting budget variance workbook...");

    let bytes = export_workbook(db, config)?;
    std::fs::write(out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;
    db.log_audit(&caller.username, "export_budgets", Some("budget"), None, None)?;

    println!("✅ Wrote {} ({} bytes)", out.display(), bytes.len());
    println!(
        "   Ledger centres: {}",
        config.designated_centres.join(", ")
    );
    Ok(())
}
