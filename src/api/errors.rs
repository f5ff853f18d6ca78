//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::middleware::RequestId;
use crate::errors::StakehouseError;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code (VALIDATION, STATE_CONFLICT, ...)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (can be any JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Domain error paired with the request id it surfaced under
#[derive(Debug)]
pub struct ApiError {
    pub error: StakehouseError,
    pub request_id: String,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, error: StakehouseError) -> Self {
        Self {
            error,
            request_id: request_id.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.request_id, self.error)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.error {
            StakehouseError::Validation(_) | StakehouseError::InsufficientFunds { .. } => {
                StatusCode::BAD_REQUEST
            }
            StakehouseError::StateConflict(_) => StatusCode::CONFLICT,
            StakehouseError::NotFound(_) => StatusCode::NOT_FOUND,
            StakehouseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let details = match &self.error {
            StakehouseError::InsufficientFunds {
                balance_cents,
                stake_cents,
            } => Some(serde_json::json!({
                "balance": *balance_cents as f64 / 100.0,
                "stake": *stake_cents as f64 / 100.0,
            })),
            _ => None,
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: self.error.code().to_string(),
                message: self.error.to_string(),
                details,
            },
        });

        (status, body).into_response()
    }
}

/// Json extractor whose rejections use the same error envelope as the rest
/// of the API instead of axum's plain-text bodies.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::new(
                request_id,
                StakehouseError::validation(rejection.body_text()),
            )),
        }
    }
}
