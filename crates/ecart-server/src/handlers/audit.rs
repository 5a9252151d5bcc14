//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, AuthContext, MAX_PAGE_LIMIT};
use ecart_core::{models::AuditEntry, require, Action};

/// Query parameters for audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - List audit log entries (admins only)
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require(&auth.caller, Action::Administer).map_err(AppError::from_core)?;

    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let entries = state.store.list_audit_log(limit)?;

    // Viewing the audit log is itself audited
    state.store.log_audit(
        &auth.caller.username,
        "list",
        Some("audit_log"),
        None,
        Some(&format!("limit={}", limit)),
    )?;

    Ok(Json(entries))
}
