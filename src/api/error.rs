use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ApiResponse;
use crate::services::{
    AdminError, AuditError, AuthError, ElectionError, PartyError, RegistrationError, VoteError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("insufficient privilege")]
    Forbidden,

    #[error("Account locked. Try again in {remaining_minutes} minute(s)")]
    Locked { remaining_minutes: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            // A denial never says which level would have sufficed.
            Self::Forbidden => (StatusCode::FORBIDDEN, "insufficient privilege".to_string()),
            Self::Locked { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Locked { remaining_minutes } => Self::Locked { remaining_minutes },
            AuthError::PasswordPolicy(msg) => Self::Validation(msg.to_string()),
            AuthError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<ElectionError> for ApiError {
    fn from(err: ElectionError) -> Self {
        match err {
            ElectionError::AccessDenied(_) => Self::Forbidden,
            ElectionError::InvalidWindow(e) => Self::Validation(e.to_string()),
            ElectionError::BadConfirmation | ElectionError::ElectionInProgress => {
                Self::Conflict(err.to_string())
            }
            ElectionError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::UnknownParty => Self::Validation(err.to_string()),
            VoteError::PasswordNotChanged => Self::Conflict(err.to_string()),
            VoteError::UnknownVoter => Self::Unauthorized(err.to_string()),
            VoteError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AccessDenied(_) => Self::Forbidden,
            RegistrationError::DuplicateFin
            | RegistrationError::DuplicatePhone
            | RegistrationError::ElectionInProgress
            | RegistrationError::RegistrationClosed => Self::Conflict(err.to_string()),
            RegistrationError::InvalidFin => Self::Validation(err.to_string()),
            RegistrationError::InvalidField(msg) => Self::Validation(msg.to_string()),
            RegistrationError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::AccessDenied(_) => Self::Forbidden,
            AdminError::DuplicateUsername
            | AdminError::SelfDeletion
            | AdminError::BootstrapImmutable => Self::Conflict(err.to_string()),
            AdminError::NotFound => Self::NotFound(err.to_string()),
            AdminError::InvalidField(msg) => Self::Validation(msg.to_string()),
            AdminError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::AccessDenied(_) => Self::Forbidden,
            PartyError::NotFound => Self::NotFound(err.to_string()),
            PartyError::InvalidField(msg) => Self::Validation(msg.to_string()),
            PartyError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::AccessDenied(_) => Self::Forbidden,
            AuditError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}
