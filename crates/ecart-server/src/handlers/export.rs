//! Spreadsheet export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    Extension,
};
use tracing::info;

use crate::{AppError, AppState, AuthContext};
use ecart_core::report::export_workbook;
use ecart_core::spreadsheet::{EXPORT_FILENAME, XLSX_CONTENT_TYPE};

/// GET /api/export/budgets - Download the variance analysis workbook
pub async fn export_budgets(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Response<Body>, AppError> {
    state.store.log_audit(
        &auth.caller.username,
        "export_budgets",
        Some("budget"),
        None,
        Some(&format!(
            "designated={}",
            state.config.report.designated_centres.join(",")
        )),
    )?;

    let bytes = export_workbook(state.store.as_ref(), &state.config.report)?;
    info!(bytes = bytes.len(), "Exported variance workbook");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(&e.to_string()))
}
