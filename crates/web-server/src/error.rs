use alerter::AlertSeverity;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    /// A storage failure while moving money; alerts are raised as critical.
    #[error("Payroll error: {0}")]
    Payroll(DbError),
    #[error("Invalid input: {0}")]
    Validation(#[from] CoreError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Attached to 5xx responses so the alerting middleware can email an
/// administrator without re-parsing the body.
#[derive(Debug, Clone)]
pub struct ServerErrorReport {
    pub severity: AlertSeverity,
    pub kind: &'static str,
    pub message: String,
}

/// Storage errors the client caused, with the status they map to.
fn client_db_error(err: &DbError) -> Option<(StatusCode, String)> {
    match err {
        DbError::NotFound => Some((StatusCode::NOT_FOUND, "Record not found".to_string())),
        DbError::Duplicate(key) => Some((
            StatusCode::CONFLICT,
            format!("A record with the same {key} already exists"),
        )),
        DbError::MissingReference(what) => Some((
            StatusCode::BAD_REQUEST,
            format!("Referenced record does not exist: {what}"),
        )),
        DbError::InvalidTableName(name) => Some((
            StatusCode::BAD_REQUEST,
            format!("'{name}' is not a valid table name"),
        )),
        _ => None,
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, report) = match self {
            AppError::Database(db_err) => match client_db_error(&db_err) {
                Some((status, message)) => (status, message, None),
                None => {
                    tracing::error!(error = ?db_err, "Database error.");
                    let report = ServerErrorReport {
                        severity: AlertSeverity::High,
                        kind: "database",
                        message: db_err.to_string(),
                    };
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal database error occurred".to_string(),
                        Some(report),
                    )
                }
            },
            AppError::Payroll(db_err) => match client_db_error(&db_err) {
                Some((status, message)) => (status, message, None),
                None => {
                    tracing::error!(error = ?db_err, "Payroll processing error.");
                    let report = ServerErrorReport {
                        severity: AlertSeverity::Critical,
                        kind: "payroll",
                        message: db_err.to_string(),
                    };
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Payroll processing failed".to_string(),
                        Some(report),
                    )
                }
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message, None),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Internal error.");
                let report = ServerErrorReport {
                    severity: AlertSeverity::Medium,
                    kind: "internal",
                    message,
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Some(report),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        let mut response = (status, body).into_response();
        if let Some(report) = report {
            response.extensions_mut().insert(report);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_caused_storage_errors_are_not_server_errors() {
        let response =
            AppError::Database(DbError::Duplicate("employee_number".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.extensions().get::<ServerErrorReport>().is_none());

        let response =
            AppError::Database(DbError::MissingReference("employee 9".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn payroll_failures_carry_a_critical_report() {
        let response =
            AppError::Payroll(DbError::ConnectionConfigError("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ServerErrorReport>().unwrap();
        assert_eq!(report.severity, AlertSeverity::Critical);
        assert_eq!(report.kind, "payroll");
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response =
            AppError::from(CoreError::invalid("justification", "is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
