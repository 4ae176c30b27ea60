use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("phase violation: {0}")]
    PhaseViolation(String),
    #[error("slippage violation: {0}")]
    SlippageViolation(String),
    #[error("ordering violation: {0}")]
    OrderingViolation(String),
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("not started yet")]
    NotStarted,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("arithmetic overflow")]
    Overflow,
}

impl MarketError {
    fn code(&self) -> &'static str {
        match self {
            MarketError::InvalidArgument(_) => "INVALID_ARGUMENT",
            MarketError::PhaseViolation(_) => "PHASE_VIOLATION",
            MarketError::SlippageViolation(_) => "SLIPPAGE_VIOLATION",
            MarketError::OrderingViolation(_) => "ORDERING_VIOLATION",
            MarketError::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            MarketError::NotAuthorized(_) => "NOT_AUTHORIZED",
            MarketError::NothingToClaim => "NOTHING_TO_CLAIM",
            MarketError::NotStarted => "NOT_STARTED",
            MarketError::NotFound(_) => "NOT_FOUND",
            MarketError::Overflow => "OVERFLOW",
        }
    }

    fn body(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            details: None,
        }
    }
}

impl ResponseError for MarketError {
    fn error_response(&self) -> HttpResponse {
        match self {
            MarketError::InvalidArgument(_) => HttpResponse::BadRequest().json(self.body()),
            MarketError::PhaseViolation(_) => HttpResponse::Forbidden().json(self.body()),
            MarketError::SlippageViolation(_)
            | MarketError::OrderingViolation(_)
            | MarketError::InsufficientBalance(_)
            | MarketError::NothingToClaim
            | MarketError::NotStarted => HttpResponse::Conflict().json(self.body()),
            MarketError::NotAuthorized(_) => HttpResponse::Unauthorized().json(self.body()),
            MarketError::NotFound(_) => HttpResponse::NotFound().json(self.body()),
            MarketError::Overflow => HttpResponse::InternalServerError().json(self.body()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        use actix_web::http::StatusCode;

        let cases = [
            (
                MarketError::InvalidArgument("must be > 0".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MarketError::PhaseViolation("not sale period".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                MarketError::SlippageViolation("less than min".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                MarketError::NotAuthorized("caller is not the owner".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (MarketError::NothingToClaim, StatusCode::CONFLICT),
            (MarketError::Overflow, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.error_response().status(), status);
        }
    }
}
