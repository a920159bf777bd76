//! Errors for the fallible edges of the crate: loading lyrics, loading and
//! validating configuration. The matching and scroll core never fails; its
//! "nothing to do" outcomes are `Option`s.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrollError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScrollError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type ScrollResult<T> = Result<T, ScrollError>;
