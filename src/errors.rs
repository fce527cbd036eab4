use thiserror::Error;

use crate::credentials::CredentialError;
use crate::identity::IdentityError;

// -----------------------------------------------------------------------------
// ----- Status codes ----------------------------------------------------------

pub const STATUS_OK: i32 = 0;
pub const STATUS_FAILED: i32 = 1;

// -----------------------------------------------------------------------------
// ----- GatewayError ----------------------------------------------------------

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Configuration(#[from] CredentialError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("no active session for gateway '{key}'")]
    Lookup { key: String },

    #[error("transaction error: {0}")]
    Transaction(String),
}

// -----------------------------------------------------------------------------
// ----- GatewayError: Public --------------------------------------------------

impl GatewayError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }

    pub fn lookup(key: impl Into<String>) -> Self {
        Self::Lookup { key: key.into() }
    }

    /// Every error kind collapses to the same status at the C boundary.
    pub fn status(&self) -> i32 {
        STATUS_FAILED
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Connection(_) => "connection",
            GatewayError::Identity(_) => "identity",
            GatewayError::Lookup { .. } => "lookup",
            GatewayError::Transaction(_) => "transaction",
        }
    }
}

impl From<tonic::Status> for GatewayError {
    fn from(status: tonic::Status) -> Self {
        GatewayError::Transaction(format!("{}: {}", status.code(), status.message()))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
