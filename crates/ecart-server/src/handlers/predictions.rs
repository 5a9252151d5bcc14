//! Expense forecasting handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, AuthContext};
use ecart_core::report::predict_centre_total;
use ecart_core::ForecastOutcome;

/// Error for an integer trimester outside 1..=4
pub const TRIMESTER_RANGE: &str = "Trimester must be between 1 and 4";

/// Query parameters for a prediction; all three are required
#[derive(Debug, Default, Deserialize)]
pub struct PredictionQuery {
    pub centre_id: Option<String>,
    pub trimester: Option<String>,
    pub annee: Option<String>,
}

/// Prediction body; `message` is present only for degenerate history
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    pub r2_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ForecastOutcome> for PredictionResponse {
    fn from(outcome: ForecastOutcome) -> Self {
        let values = outcome.values();
        Self {
            prediction: values.predicted_total,
            r2_score: values.r2_score,
            message: outcome.message().map(str::to_string),
        }
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// GET /api/predictions - Forecast a centre's expense total for a quarter
pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PredictionQuery>,
) -> Result<Json<PredictionResponse>, AppError> {
    let (Some(centre_id), Some(trimester), Some(annee)) = (
        required(&params.centre_id),
        required(&params.trimester),
        required(&params.annee),
    ) else {
        return Err(AppError::bad_request(
            "Missing 'centre_id', 'trimester', or 'annee'",
        ));
    };

    let (Ok(trimester), Ok(year)) = (trimester.parse::<i64>(), annee.parse::<i32>()) else {
        return Err(AppError::bad_request("Invalid trimester or annee format"));
    };
    let quarter = u32::try_from(trimester)
        .ok()
        .filter(|q| (1..=4).contains(q))
        .ok_or_else(|| AppError::bad_request(TRIMESTER_RANGE))?;

    // Centre ids are opaque: one that is not an integer cannot have history
    let centre_id = centre_id.parse::<i64>().ok();

    state.store.log_audit(
        &auth.caller.username,
        "predict",
        Some("centre"),
        centre_id,
        Some(&format!("trimester={}, annee={}", quarter, year)),
    )?;

    let outcome = match centre_id {
        Some(id) => predict_centre_total(state.store.as_ref(), id, year, quarter)?,
        None => ForecastOutcome::NoHistory,
    };

    Ok(Json(outcome.into()))
}
