//! Authentication-related handlers

use axum::{Extension, Json};
use serde::Serialize;

use crate::AuthContext;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated username or identifier
    pub user: String,
    pub role: String,
    /// How the user was authenticated
    pub auth_method: String,
}

/// GET /api/me - The resolved caller
pub async fn get_me(Extension(auth): Extension<AuthContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user: auth.caller.username,
        role: auth.caller.role.to_string(),
        auth_method: auth.method.as_str().to_string(),
    })
}
