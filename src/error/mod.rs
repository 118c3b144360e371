use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::notification::DispatchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn masked(log_msg: &str, client_default: &str) -> String {
    if is_production() {
        client_default.to_string()
    } else {
        log_msg.to_string()
    }
}

impl AppError {
    fn response_parts(&self) -> (StatusCode, &'static str, String, String) {
        match self {
            AppError::Config(e) => {
                let log_msg = e.to_string();
                let client_msg = masked(&log_msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", client_msg, log_msg)
            }
            AppError::Dispatch(e) => {
                let log_msg = e.to_string();
                match e {
                    DispatchError::InvalidInput(_) => (
                        StatusCode::BAD_REQUEST,
                        "INVALID_INPUT",
                        log_msg.clone(),
                        log_msg,
                    ),
                    DispatchError::ProfileNotFound(_) => (
                        StatusCode::NOT_FOUND,
                        "PROFILE_NOT_FOUND",
                        log_msg.clone(),
                        log_msg,
                    ),
                    DispatchError::AccountNotFound(_) => (
                        StatusCode::NOT_FOUND,
                        "ACCOUNT_NOT_FOUND",
                        log_msg.clone(),
                        log_msg,
                    ),
                    DispatchError::TokenMissing(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "TOKEN_MISSING",
                        log_msg.clone(),
                        log_msg,
                    ),
                    DispatchError::InvalidParticipantKind(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "INVALID_PARTICIPANT_KIND",
                        log_msg.clone(),
                        log_msg,
                    ),
                    DispatchError::DeliveryFailed(_) => (
                        StatusCode::BAD_GATEWAY,
                        "DELIVERY_FAILED",
                        masked(&log_msg, "Push delivery failed"),
                        log_msg,
                    ),
                    DispatchError::StoreWriteFailed(_) | DispatchError::Store(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORE_ERROR",
                        masked(&log_msg, "Service temporarily unavailable"),
                        log_msg,
                    ),
                }
            }
            AppError::Internal(e) => {
                let log_msg = e.clone();
                let client_msg = masked(&log_msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", client_msg, log_msg)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message, log_message) = self.response_parts();

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
