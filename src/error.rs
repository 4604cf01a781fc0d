//! Error types and handling for `OutfitAI`

use thiserror::Error;

/// Main error type for the `OutfitAI` application
#[derive(Error, Debug)]
pub enum OutfitAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Credentials rejected by an external service
    #[error("Authentication error: {service} rejected the configured credentials")]
    Authentication { service: String },

    /// External service asked us to slow down
    #[error("Rate limit error: {service} rate limit exceeded")]
    RateLimited { service: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl OutfitAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn authentication<S: Into<String>>(service: S) -> Self {
        Self::Authentication {
            service: service.into(),
        }
    }

    pub fn rate_limited<S: Into<String>>(service: S) -> Self {
        Self::RateLimited {
            service: service.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            OutfitAiError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            OutfitAiError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            OutfitAiError::Authentication { service } => {
                format!("{service} rejected the API key. Please check your credentials.")
            }
            OutfitAiError::RateLimited { service } => {
                format!("{service} is rate limiting requests. Please try again later.")
            }
            OutfitAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            OutfitAiError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            OutfitAiError::Io { .. } => {
                "File operation failed. Please check the path and file permissions.".to_string()
            }
            OutfitAiError::General { message } => message.clone(),
        }
    }
}
