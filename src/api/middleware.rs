//! API middleware
//!
//! Contains middleware for:
//! - Gateway trust (extracting the authenticated actor's role)
//! - Authorization (admin capability check)
//!
//! Authentication itself happens upstream: an authentication gateway
//! verifies the session and forwards the caller's role in the
//! `x-authenticated-role` header. This layer only checks the role it is
//! handed and never re-derives it.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::db::repositories::CommentRepository;
use crate::models::UserRole;
use crate::services::{
    IdentityError, IdentityService, MetricsError, MetricsService, ModerationError,
    ModerationService,
};

/// Header the authentication gateway uses to forward the caller's role
pub const ACTOR_ROLE_HEADER: &str = "x-authenticated-role";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub moderation_service: Arc<ModerationService>,
    pub identity_service: Arc<IdentityService>,
    pub metrics_service: Arc<MetricsService>,
    pub comment_repo: Arc<dyn CommentRepository>,
}

/// The authenticated actor as reported by the gateway
#[derive(Debug, Clone, Copy)]
pub struct GatewayActor(pub UserRole);

/// Error response for API errors.
///
/// Every failure carries `success: false`, a machine-readable code and a
/// human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn store_error(message: impl Into<String>) -> Self {
        Self::new("STORE_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            // Surfaced like a missing entity, but with its own code so the
            // approved-but-unpromoted partial state stays identifiable
            "ORPHANED_REFERENCE" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::NotFound(id) => {
                ApiError::not_found(format!("Article {} not found", id))
            }
            ModerationError::ValidationError(msg) => ApiError::validation_error(msg),
            ModerationError::Store(e) => ApiError::store_error(e.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(msg) => ApiError::not_found(msg),
            IdentityError::ValidationError(msg) => ApiError::validation_error(msg),
            IdentityError::OrphanedReference { .. } => {
                ApiError::new("ORPHANED_REFERENCE", err.to_string())
            }
            IdentityError::Store(e) => ApiError::store_error(e.to_string()),
        }
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::Store(e) => ApiError::store_error(e.to_string()),
        }
    }
}

/// Extract the gateway-forwarded actor role from a request
fn extract_actor_role(request: &Request) -> Option<Result<UserRole, String>> {
    let value = request.headers().get(ACTOR_ROLE_HEADER)?;
    match value.to_str() {
        Ok(s) => Some(UserRole::from_str(s).map_err(|_| s.to_string())),
        Err(_) => Some(Err(String::new())),
    }
}

/// Admin authorization middleware.
///
/// Requires the gateway to have forwarded an authenticated role, and that
/// role to be admin. The actor is inserted into request extensions for
/// handlers that want it.
pub async fn require_admin(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let role = match extract_actor_role(&request) {
        None => {
            return Err(ApiError::unauthorized("Missing authenticated role"));
        }
        Some(Err(raw)) => {
            return Err(ApiError::forbidden(format!(
                "Unrecognized role: {}",
                raw
            )));
        }
        Some(Ok(role)) => role,
    };

    if role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin access required"));
    }

    request.extensions_mut().insert(GatewayActor(role));
    Ok(next.run(request).await)
}
