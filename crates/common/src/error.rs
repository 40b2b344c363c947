//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::ProtectionFailure`] → 500
/// - [`ServiceError::KeyUnavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: no field list, unknown entity, or invalid JSON.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A field could not be encrypted.
    #[error("protection failure: {0}")]
    ProtectionFailure(String),

    /// The field key has not been resolved and cannot be resolved right now.
    #[error("encryption key unavailable: {0}")]
    KeyUnavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::ProtectionFailure(_) => 500,
            ServiceError::KeyUnavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::ProtectionFailure(_) => "protection_failure",
            ServiceError::KeyUnavailable(_) => "key_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(
            ServiceError::ProtectionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::KeyUnavailable("x".into()).http_status(), 503);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes() {
        assert_eq!(ServiceError::KeyUnavailable("x".into()).code(), "key_unavailable");
        assert_eq!(ServiceError::BadRequest("x".into()).code(), "bad_request");
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("unknown entity: vendor".into());
        assert!(e.to_string().contains("unknown entity: vendor"));
    }
}
