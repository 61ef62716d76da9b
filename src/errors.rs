use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payment gateway unavailable")]
    GatewayUnavailable(String),

    #[error("Notification delivery failed")]
    NotificationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput(msg) => AppError::InvalidInput(msg),
            DomainError::NotFound => AppError::NotFound,
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::GatewayUnavailable(msg) => AppError::GatewayUnavailable(msg),
            DomainError::NotificationFailed(msg) => AppError::NotificationFailed(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InvalidInput(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": msg
            })),
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Unauthorized => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid signature"
            })),
            // Upstream detail goes to the log, not the client.
            AppError::GatewayUnavailable(msg) | AppError::NotificationFailed(msg) => {
                log::error!("upstream failure: {}", msg);
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": self.to_string()
                }))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}
