//! Engine error types with HTTP status code mapping.
//!
//! [`EngineError`] is the central error type for the engine. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DrawEventId, ParticipantId, RaffleId, RaffleStatus};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid phone: must contain 7 to 15 digits",
///     "details": "phone"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`EngineError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details (the offending field for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Engine error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2099 | Not Found         | 404 Not Found                |
/// | 2100–2199 | Conflict          | 409 Conflict                 |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Draw-Specific     | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A submitted field failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Request is malformed or not allowed in the current state.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reversal confirmation token did not match.
    #[error("confirmation token does not match; reversal not performed")]
    BadConfirmation,

    /// Raffle with the given ID was not found.
    #[error("raffle not found: {0}")]
    RaffleNotFound(RaffleId),

    /// Participant with the given ID was not found in the raffle.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// No result rows exist for the given draw event.
    #[error("draw event not found: {0}")]
    EventNotFound(DrawEventId),

    /// An active participant with the same identity is already registered.
    #[error("{message}")]
    DuplicateParticipant {
        /// User-facing explanation.
        message: String,
    },

    /// Another draw or reversal is running for this raffle.
    #[error("a draw is already in progress for raffle {0}")]
    DrawInProgress(RaffleId),

    /// Some selected winners stopped being eligible before commit.
    #[error("selection is stale: {} participant(s) are no longer eligible", participants.len())]
    StaleSelection {
        /// Participants that failed re-validation.
        participants: Vec<ParticipantId>,
    },

    /// The raffle's status does not allow the operation.
    #[error("raffle {raffle_id} is {status}")]
    RaffleClosed {
        /// Raffle identifier.
        raffle_id: RaffleId,
        /// Current lifecycle status.
        status: RaffleStatus,
    },

    /// The eligible pool is empty.
    #[error("no eligible participants left in raffle {0}")]
    InsufficientParticipants(RaffleId),

    /// Database or transaction failure. Details are logged, not returned.
    #[error("storage failure during {operation}; please try again")]
    Storage {
        /// Operation that failed.
        operation: &'static str,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Builds a field-scoped validation error.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Logs a database failure with its context and returns the generic
    /// [`EngineError::Storage`] seen by callers.
    pub(crate) fn storage(
        operation: &'static str,
        raffle_id: Option<RaffleId>,
        err: &dyn std::fmt::Display,
    ) -> Self {
        match raffle_id {
            Some(raffle_id) => {
                tracing::error!(operation, %raffle_id, error = %err, "storage failure");
            }
            None => tracing::error!(operation, error = %err, "storage failure"),
        }
        Self::Storage { operation }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation { .. } => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::BadConfirmation => 1003,
            Self::RaffleNotFound(_) => 2001,
            Self::ParticipantNotFound(_) => 2002,
            Self::EventNotFound(_) => 2003,
            Self::DuplicateParticipant { .. } => 2101,
            Self::DrawInProgress(_) => 2102,
            Self::StaleSelection { .. } => 2103,
            Self::RaffleClosed { .. } => 2104,
            Self::Internal(_) => 3000,
            Self::Storage { .. } => 3001,
            Self::InsufficientParticipants(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidRequest(_) | Self::BadConfirmation => {
                StatusCode::BAD_REQUEST
            }
            Self::RaffleNotFound(_) | Self::ParticipantNotFound(_) | Self::EventNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::DuplicateParticipant { .. }
            | Self::DrawInProgress(_)
            | Self::StaleSelection { .. }
            | Self::RaffleClosed { .. } => StatusCode::CONFLICT,
            Self::InsufficientParticipants(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Validation { field, .. } => Some(field.clone()),
            Self::StaleSelection { participants } => Some(
                participants
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        let raffle_id = RaffleId::new();
        let conflicts = [
            EngineError::DuplicateParticipant {
                message: "dup".to_string(),
            },
            EngineError::DrawInProgress(raffle_id),
            EngineError::StaleSelection {
                participants: vec![ParticipantId::new()],
            },
            EngineError::RaffleClosed {
                raffle_id,
                status: RaffleStatus::Finished,
            },
        ];
        for err in conflicts {
            assert_eq!(err.status_code(), StatusCode::CONFLICT, "{err}");
        }
    }

    #[test]
    fn storage_message_is_generic() {
        let err = EngineError::storage("commit_draw", None, &"disk I/O error");
        let message = err.to_string();
        assert!(message.contains("please try again"));
        assert!(!message.contains("disk"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_details_carry_field() {
        let err = EngineError::validation("phone", "must contain 7 to 15 digits");
        assert_eq!(err.error_code(), 1001);
        assert_eq!(err.details().as_deref(), Some("phone"));
        assert_eq!(err.to_string(), "invalid phone: must contain 7 to 15 digits");
    }
}
