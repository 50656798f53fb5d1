pub mod identity;
pub mod repository;

pub use identity::{Session, SessionContext, SessionError};
pub use repository::{AuthGrant, RegistrationOutcome, RentalApi};

/// Failures talking to the rental backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing, expired or refused credentials; the user has to sign in again.
    #[error("Authentication required: {0}")]
    Auth(String),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The backend refused the request with a reason meant for the user.
    #[error("{0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Schema(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::WrongRole { .. } => ApiError::Forbidden(err.to_string()),
            other => ApiError::Auth(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
