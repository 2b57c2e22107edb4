use thiserror::Error;

/// Violations of domain invariants. Ordinary outcomes such as "product not
/// found", "insufficient stock", or "cart is empty" are NOT errors; each
/// handler converts those to a response string where it detects them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// The fault classes that can escape a handler. Persistence failures cover
/// the unreachable/timed-out store and surface to callers as a generic
/// "service unavailable" condition; retries belong to the store client.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message safe to show an end user; detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Persistence(_) => "The service is temporarily unavailable. Please retry shortly.",
            Self::Configuration(_) => "An unexpected internal error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationError, DomainError};

    #[test]
    fn domain_error_wraps_into_application_error() {
        let error =
            ApplicationError::from(DomainError::InvariantViolation("bad quantity".to_string()));
        assert!(matches!(error, ApplicationError::Domain(_)));
        assert_eq!(
            error.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn persistence_failure_has_retry_message() {
        let error = ApplicationError::Persistence("store unreachable".to_string());
        assert_eq!(
            error.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }
}
