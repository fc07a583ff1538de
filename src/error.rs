use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Draw already executed")]
    AlreadyDrawn,

    #[error("Draw window has not closed yet")]
    WindowNotClosed,

    #[error("No eligible entrants in the draw window")]
    NoEligibleEntrants,

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("No payout account configured")]
    NotConfigured,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::AlreadyDrawn => (
                actix_web::http::StatusCode::CONFLICT,
                "ALREADY_DRAWN",
                self.to_string(),
            ),
            AppError::WindowNotClosed => (
                actix_web::http::StatusCode::CONFLICT,
                "WINDOW_NOT_CLOSED",
                self.to_string(),
            ),
            AppError::NoEligibleEntrants => (
                actix_web::http::StatusCode::CONFLICT,
                "NO_ELIGIBLE_ENTRANTS",
                self.to_string(),
            ),
            AppError::StateConflict(msg) => {
                log::warn!("State conflict: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "STATE_CONFLICT",
                    msg.clone(),
                )
            }
            AppError::NotConfigured => (
                actix_web::http::StatusCode::CONFLICT,
                "NOT_CONFIGURED",
                self.to_string(),
            ),
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "EXTERNAL_API_ERROR",
                    msg.clone(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
