use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{reason}")]
    InvalidInput { reason: String },

    #[error("{reason}")]
    OutOfRange { reason: String },

    #[error("Internal failure: {0}")]
    InternalFailure(String),
}

impl DomainError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DomainError::InvalidInput { reason: reason.into() }
    }

    pub fn out_of_range(reason: impl Into<String>) -> Self {
        DomainError::OutOfRange { reason: reason.into() }
    }

    /// Stable machine-readable category carried on `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidInput { .. } => "invalid_input",
            DomainError::OutOfRange { .. } => "out_of_range",
            DomainError::InternalFailure(_) => "internal_failure",
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
