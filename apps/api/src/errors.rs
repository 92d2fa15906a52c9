use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant carries a stable machine-readable code; the response body is
/// always `{ "error": <human message>, "code": <code>, "details"?: <payload> }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Requested session of {requested_minutes} minutes exceeds the {max_minutes} minute limit")]
    DurationExceeded {
        requested_minutes: i64,
        max_minutes: i64,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Plan generation service overloaded after {retries} retries")]
    Overloaded { retries: u32 },

    #[error("Could not parse generated plan: {0}")]
    JsonParse(String),

    #[error("Generated plan is missing required fields: {}", .missing_fields.join(", "))]
    InvalidDataStructure { missing_fields: Vec<String> },

    #[error("Scheduled block '{0}' does not match any submitted story")]
    UnknownStory(String),

    #[error("Block '{block}' duration mismatch: reported {reported}, computed {computed}")]
    BlockDuration {
        block: String,
        reported: i64,
        computed: i64,
    },

    #[error("Block '{block}' schedules {run_minutes} continuous work minutes (limit {limit})")]
    ExcessiveWorkTime {
        block: String,
        run_minutes: i64,
        limit: i64,
    },

    #[error("{} of {expected} tasks missing from the generated plan", .missing_titles.len())]
    MissingTasks {
        missing_titles: Vec<String>,
        expected: usize,
        scheduled: usize,
    },

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DurationExceeded { .. } => "DURATION_EXCEEDED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Overloaded { .. } => "OVERLOADED",
            AppError::JsonParse(_) => "JSON_PARSE_ERROR",
            AppError::InvalidDataStructure { .. } => "INVALID_DATA_STRUCTURE",
            AppError::UnknownStory(_) => "UNKNOWN_STORY",
            AppError::BlockDuration { .. } => "BLOCK_DURATION_ERROR",
            AppError::ExcessiveWorkTime { .. } => "EXCESSIVE_WORK_TIME",
            AppError::MissingTasks { .. } => "MISSING_TASKS",
            AppError::Processing(_) => "PROCESSING_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::DurationExceeded { .. }
            | AppError::Validation(_)
            | AppError::UnknownStory(_)
            | AppError::BlockDuration { .. }
            | AppError::ExcessiveWorkTime { .. }
            | AppError::MissingTasks { .. } => StatusCode::BAD_REQUEST,
            // Anthropic-style "overloaded" status; axum has no named constant for it.
            AppError::Overloaded { .. } => {
                StatusCode::from_u16(529).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
            AppError::JsonParse(_)
            | AppError::InvalidDataStructure { .. }
            | AppError::Processing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured detail payload, when the variant carries one.
    fn details(&self) -> Option<Value> {
        match self {
            AppError::DurationExceeded {
                requested_minutes,
                max_minutes,
            } => Some(json!({
                "requestedMinutes": requested_minutes,
                "maxMinutes": max_minutes,
            })),
            AppError::InvalidDataStructure { missing_fields } => {
                Some(json!({ "missingFields": missing_fields }))
            }
            AppError::BlockDuration {
                block,
                reported,
                computed,
            } => Some(json!({
                "block": block,
                "reportedDuration": reported,
                "computedDuration": computed,
            })),
            AppError::ExcessiveWorkTime {
                block,
                run_minutes,
                limit,
            } => Some(json!({
                "block": block,
                "continuousWorkMinutes": run_minutes,
                "limit": limit,
            })),
            AppError::MissingTasks {
                missing_titles,
                expected,
                scheduled,
            } => Some(json!({
                "missingTasks": missing_titles,
                "expectedCount": expected,
                "scheduledCount": scheduled,
            })),
            AppError::Processing(msg) => Some(json!({ "message": msg })),
            AppError::Internal(e) => Some(json!({ "message": e.to_string() })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!("{code}: {self}");
        } else {
            tracing::warn!("{code}: {self}");
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": code,
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overloaded_maps_to_529() {
        let err = AppError::Overloaded { retries: 3 };
        assert_eq!(err.status().as_u16(), 529);
        assert_eq!(err.code(), "OVERLOADED");
    }

    #[test]
    fn test_reconciliation_errors_are_client_class() {
        let err = AppError::MissingTasks {
            missing_titles: vec!["Write summary".to_string()],
            expected: 5,
            scheduled: 4,
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "MISSING_TASKS");
    }

    #[test]
    fn test_parse_errors_are_server_class() {
        assert_eq!(
            AppError::JsonParse("unexpected EOF".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InvalidDataStructure {
                missing_fields: vec!["summary".to_string()]
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_tasks_details_payload() {
        let err = AppError::MissingTasks {
            missing_titles: vec!["Draft intro".to_string(), "Review edits".to_string()],
            expected: 6,
            scheduled: 4,
        };
        let details = err.details().unwrap();
        assert_eq!(details["missingTasks"][0], "Draft intro");
        assert_eq!(details["expectedCount"], 6);
        assert_eq!(details["scheduledCount"], 4);
    }

    #[test]
    fn test_duration_exceeded_details_payload() {
        let err = AppError::DurationExceeded {
            requested_minutes: 1500,
            max_minutes: 1440,
        };
        assert_eq!(err.code(), "DURATION_EXCEEDED");
        let details = err.details().unwrap();
        assert_eq!(details["requestedMinutes"], 1500);
        assert_eq!(details["maxMinutes"], 1440);
    }
}
