//! Request and response types exchanged with the protection service.
//!
//! All bodies are JSON. A record is a flat JSON object as fetched from, or
//! about to be written to, the application database.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /records/encrypt` and `POST /records/decrypt`.
///
/// The protected columns come from `fields` when present, otherwise from the
/// registered field set for `entity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Registered entity name, e.g. `"applicant"`.
    #[serde(default)]
    pub entity: Option<String>,
    /// Explicit list of protected column names.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// The row itself.
    pub record: serde_json::Map<String, serde_json::Value>,
}

/// Successful response body for `POST /records/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRecordResponse {
    /// The row with every protected column in stored form.
    pub record: serde_json::Map<String, serde_json::Value>,
    /// Number of columns that were encrypted by this call.
    pub encrypted: usize,
}

/// Successful response body for `POST /records/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRecordResponse {
    /// The row with every decryptable protected column in plaintext.
    pub record: serde_json::Map<String, serde_json::Value>,
    /// Columns that looked encrypted but could not be decrypted. Their values
    /// are returned unchanged.
    #[serde(default)]
    pub failed_fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the field key is resolved.
    pub key_ready: bool,
    /// Number of registered entity field sets.
    pub field_sets_loaded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_request_defaults_optional_selectors() {
        let req: RecordRequest =
            serde_json::from_value(json!({ "record": { "applicant_full_name": "Maria" } }))
                .unwrap();
        assert!(req.entity.is_none());
        assert!(req.fields.is_none());
        assert_eq!(req.record["applicant_full_name"], "Maria");
    }

    #[test]
    fn record_request_rejects_non_object_record() {
        let res: Result<RecordRequest, _> =
            serde_json::from_value(json!({ "entity": "applicant", "record": [1, 2] }));
        assert!(res.is_err());
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "unknown entity");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("unknown entity"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            key_ready: true,
            field_sets_loaded: 5,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.field_sets_loaded, 5);
    }
}
