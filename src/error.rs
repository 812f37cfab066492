use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Unique,
    NotNull,
    ForeignKey,
    Check,
}

impl Constraint {
    // SQLite reports some violations with a generic code, so fall back to the message text.
    fn classify(kind: &DatabaseErrorKind, message: &str) -> Option<Self> {
        match kind {
            DatabaseErrorKind::UniqueViolation => Some(Self::Unique),
            DatabaseErrorKind::ForeignKeyViolation => Some(Self::ForeignKey),
            DatabaseErrorKind::NotNullViolation => Some(Self::NotNull),
            DatabaseErrorKind::CheckViolation => Some(Self::Check),
            _ if message.contains("UNIQUE constraint failed") => Some(Self::Unique),
            _ if message.contains("FOREIGN KEY constraint failed") => Some(Self::ForeignKey),
            _ if message.contains("NOT NULL constraint failed") => Some(Self::NotNull),
            _ if message.contains("CHECK constraint failed") => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("admin privileges required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("integrity error ({constraint:?}): {message}")]
    Integrity {
        constraint: Constraint,
        message: String,
    },

    #[error("database error: {0}")]
    Database(DieselError),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            Self::Integrity { constraint, .. } => Some(*constraint),
            _ => None,
        }
    }
}

impl From<DieselError> for AppError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => Self::NotFound("record".to_string()),
            DieselError::DatabaseError(kind, info) => {
                match Constraint::classify(&kind, info.message()) {
                    Some(constraint) => Self::Integrity {
                        constraint,
                        message: info.message().to_string(),
                    },
                    None => Self::Database(DieselError::DatabaseError(kind, info)),
                }
            }
            other => Self::Database(other),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::Hash(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message: message.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Integrity { .. } => StatusCode::CONFLICT,
            Self::Database(_)
            | Self::Pool(_)
            | Self::Blocking(_)
            | Self::Hash(_)
            | Self::Token(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("{}", self);
            "The server encountered an internal error.".to_string()
        } else if let Some(constraint) = self.constraint() {
            log::warn!("rejected write ({:?} constraint): {}", constraint, self);
            self.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorBody::new(status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Unauthorized("missing token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::from(DieselError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Hash("bad salt".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn integrity_errors_answer_conflict() {
        let err = AppError::Integrity {
            constraint: Constraint::Unique,
            message: "UNIQUE constraint failed: users.email".into(),
        };
        assert_eq!(err.constraint(), Some(Constraint::Unique));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden.constraint(), None);
    }

    #[test]
    fn constraint_falls_back_to_message() {
        let kind = DatabaseErrorKind::Unknown;
        assert_eq!(
            Constraint::classify(&kind, "FOREIGN KEY constraint failed"),
            Some(Constraint::ForeignKey)
        );
        assert_eq!(
            Constraint::classify(&kind, "UNIQUE constraint failed: users.email"),
            Some(Constraint::Unique)
        );
        assert_eq!(Constraint::classify(&kind, "disk I/O error"), None);
    }
}
