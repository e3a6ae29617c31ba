//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unexpected status {status} for {method} {url}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
    },

    #[error("{0}")]
    Common(#[from] storefront_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<chromiumoxide::error::CdpError> for E2eError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        E2eError::Browser(e.to_string())
    }
}

impl E2eError {
    /// Whether this is an assertion mismatch rather than an infrastructure failure
    pub fn is_assertion(&self) -> bool {
        use storefront_common::Error as C;
        matches!(
            self,
            E2eError::AssertionFailed(_)
                | E2eError::Common(
                    C::Listing(_) | C::MissingField(_) | C::FieldType { .. } | C::PriceParse { .. }
                )
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
