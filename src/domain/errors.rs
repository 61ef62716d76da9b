use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("Notification delivery failed: {0}")]
    NotificationFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
