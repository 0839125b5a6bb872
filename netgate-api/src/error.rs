//! Error types for the API layer.

use thiserror::Error;

/// Errors raised before a request reaches a device.
#[derive(Error, Debug)]
pub enum ApiError {
    /// None of the credential variable pairs is set
    #[error("No device credentials: set NETGATE_USERNAME and NETGATE_PASSWORD")]
    MissingCredentials,

    /// A setting could not be parsed
    #[error("Invalid value for {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    /// No route matches the path
    #[error("Not Found")]
    NotFound,

    /// The path exists but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// `interfaces-config` called without `interface_name`
    #[error("No interface specified!")]
    MissingInterface,

    /// The request body is missing or does not describe an interface
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The gateway could not be built
    #[error(transparent)]
    Gateway(#[from] netgate::Error),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound | ApiError::MissingInterface => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::InvalidBody(_) => 422,
            ApiError::MissingCredentials
            | ApiError::InvalidSetting { .. }
            | ApiError::Gateway(_) => 500,
        }
    }
}

/// Result type alias using the API error.
pub type Result<T> = std::result::Result<T, ApiError>;
