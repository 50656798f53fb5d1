use carrent_booking::FormError;
use carrent_core::{ApiError, SessionError};
use carrent_store::{ConfigError, SessionStoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    SessionStore(#[from] SessionStoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input refused before anything is sent.
    #[error("{0}")]
    InvalidInput(String),
}

/// Missing session is `Auth`, wrong role is `Forbidden`.
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Api(err.into())
    }
}

impl AppError {
    /// The stored session is unusable; the user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, AppError::Api(err) if err.is_auth())
    }
}

pub type AppResult<T> = Result<T, AppError>;
