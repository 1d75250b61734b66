//! Error types for tripplan
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::llm::ProviderError;

/// All error types that can occur while planning a trip
#[derive(Debug, Error)]
pub enum TripPlanError {
    /// A required prompt variable was not supplied
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Caller input violates a request invariant
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The generation backend failed (auth, rate limit, network)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The backend produced unparseable or schema-violating output
    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    /// Declared template variables disagree with the template body
    #[error("Template mismatch: {0}")]
    TemplateMismatch(String),

    /// Template engine failure
    #[error("Render error: {0}")]
    Render(String),
}

/// What a caller can do about a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Correct the request or credentials and resubmit
    FixInput,
    /// Backend trouble; wait before trying again
    RetryLater,
    /// Output was nondeterministically bad; the same request may succeed
    RetrySame,
    /// A defect in the crate itself
    NotRecoverable,
}

impl TripPlanError {
    /// Classify the error for the caller
    pub fn recovery(&self) -> Recovery {
        match self {
            TripPlanError::MissingField(_) | TripPlanError::InvalidRequest(_) => Recovery::FixInput,
            TripPlanError::Provider(e) if e.is_retryable() => Recovery::RetryLater,
            TripPlanError::Provider(ProviderError::InvalidResponse(_)) => Recovery::RetrySame,
            TripPlanError::Provider(_) => Recovery::FixInput,
            TripPlanError::MalformedOutput(_) => Recovery::RetrySame,
            TripPlanError::TemplateMismatch(_) | TripPlanError::Render(_) => Recovery::NotRecoverable,
        }
    }

    /// The underlying provider error, if this is one
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            TripPlanError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for tripplan operations
pub type Result<T> = std::result::Result<T, TripPlanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_field_error() {
        let err = TripPlanError::MissingField("location".to_string());
        assert_eq!(err.to_string(), "Missing field: location");
    }

    #[test]
    fn test_malformed_output_error() {
        let err = TripPlanError::MalformedOutput("itinerary is not an array".to_string());
        assert_eq!(err.to_string(), "Malformed output: itinerary is not an array");
    }

    #[test]
    fn test_provider_error_conversion() {
        let provider = ProviderError::RateLimited {
            retry_after: Duration::from_secs(30),
        };
        let err: TripPlanError = provider.into();
        assert!(matches!(err, TripPlanError::Provider(ProviderError::RateLimited { .. })));
        assert!(err.as_provider().is_some_and(|p| p.is_retryable()));
    }

    #[test]
    fn test_recovery_classification() {
        assert_eq!(TripPlanError::MissingField("x".to_string()).recovery(), Recovery::FixInput);
        assert_eq!(TripPlanError::InvalidRequest("x".to_string()).recovery(), Recovery::FixInput);
        assert_eq!(
            TripPlanError::Provider(ProviderError::Timeout(Duration::from_secs(5))).recovery(),
            Recovery::RetryLater
        );
        assert_eq!(TripPlanError::MalformedOutput("x".to_string()).recovery(), Recovery::RetrySame);
        assert_eq!(TripPlanError::Render("x".to_string()).recovery(), Recovery::NotRecoverable);
    }

    #[test]
    fn test_provider_recovery_follows_retryability() {
        let recovery = |e: ProviderError| TripPlanError::Provider(e).recovery();

        assert_eq!(
            recovery(ProviderError::RateLimited {
                retry_after: Duration::from_secs(30)
            }),
            Recovery::RetryLater
        );
        assert_eq!(
            recovery(ProviderError::Api {
                status: 529,
                message: "Overloaded".to_string()
            }),
            Recovery::RetryLater
        );
        assert_eq!(
            recovery(ProviderError::MissingApiKey {
                env_var: "ANTHROPIC_API_KEY".to_string()
            }),
            Recovery::FixInput
        );
        assert_eq!(
            recovery(ProviderError::Authentication {
                status: 401,
                message: "invalid x-api-key".to_string()
            }),
            Recovery::FixInput
        );
        assert_eq!(
            recovery(ProviderError::Api {
                status: 400,
                message: "max_tokens too large".to_string()
            }),
            Recovery::FixInput
        );
        assert_eq!(
            recovery(ProviderError::InvalidResponse("no text block".to_string())),
            Recovery::RetrySame
        );
    }

    #[test]
    fn test_as_provider_none_for_other_kinds() {
        assert!(TripPlanError::MalformedOutput("x".to_string()).as_provider().is_none());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(TripPlanError::MissingField("location".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
