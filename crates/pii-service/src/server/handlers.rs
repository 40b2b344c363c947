//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptRecordResponse, EncryptRecordResponse, ErrorResponse, HealthResponse, RecordRequest,
};
use common::ServiceError;
use pii_guard::{FieldSet, ProtectionError};
use tracing::{debug, warn};

use super::state::AppState;
use crate::fields::RegistryError;

/// `POST /records/encrypt` — put every protected column of a row in stored form.
///
/// Values that already have the stored shape are left untouched, so a row
/// forwarded from another table is never encrypted twice.
pub async fn encrypt_record(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> Response {
    let fields = match resolve_fields(&state, &req) {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let mut record = req.record;
    match state.protector.encrypt_fields(&mut record, &fields).await {
        Ok(encrypted) => {
            debug!(fields = fields.len(), encrypted, "record encrypted");
            (StatusCode::OK, Json(EncryptRecordResponse { record, encrypted })).into_response()
        }
        Err(e) => error_response(protection_error(e)),
    }
}

/// `POST /records/decrypt` — turn every decryptable protected column back into plaintext.
///
/// A column that fails to decrypt keeps its stored value and is named in
/// `failed_fields`; the row is still returned with `200 OK`.
pub async fn decrypt_record(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> Response {
    let fields = match resolve_fields(&state, &req) {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let mut record = req.record;
    match state.protector.decrypt_fields(&mut record, &fields).await {
        Ok(report) => {
            if !report.failed.is_empty() {
                warn!(
                    failed = ?report.failed,
                    decrypted = report.decrypted,
                    "some protected fields could not be decrypted"
                );
            }
            let body = DecryptRecordResponse {
                record,
                failed_fields: report.failed,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(protection_error(e)),
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the field key is resolved, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.protector.is_ready();
    let field_sets_loaded = state.field_sets.len();

    let (status_code, status_str) = if key_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_ready,
        field_sets_loaded,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Explicit `fields` win over `entity`; one of the two is required.
fn resolve_fields(state: &AppState, req: &RecordRequest) -> Result<FieldSet, ServiceError> {
    if let Some(fields) = &req.fields {
        return Ok(FieldSet::new(fields.iter().cloned()));
    }
    match &req.entity {
        Some(entity) => state.field_sets.get(entity).map_err(|e| match e {
            RegistryError::UnknownEntity(_) => ServiceError::BadRequest(e.to_string()),
            RegistryError::Parse(_) => ServiceError::Internal(e.to_string()),
        }),
        None => Err(ServiceError::BadRequest(
            "either `fields` or `entity` is required".into(),
        )),
    }
}

/// Map a library error to a caller-safe service error. Details stay in logs.
fn protection_error(e: ProtectionError) -> ServiceError {
    match e {
        ProtectionError::Key(e) => {
            warn!(error = %e, "field key unavailable");
            ServiceError::KeyUnavailable("field key not resolved".into())
        }
        ProtectionError::Cipher(e) => {
            warn!(error = %e, "field encryption failed");
            ServiceError::ProtectionFailure("encryption failed".into())
        }
    }
}

fn error_response(e: ServiceError) -> Response {
    let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(e.code(), e.to_string());
    (status, Json(body)).into_response()
}
