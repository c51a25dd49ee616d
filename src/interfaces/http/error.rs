use crate::error::{BuddyError, FieldError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

impl BuddyError {
    pub fn status(&self) -> StatusCode {
        match self {
            BuddyError::Validation(_)
            | BuddyError::NoAdvisorAvailable
            | BuddyError::InvalidSignature => StatusCode::BAD_REQUEST,
            BuddyError::NotFound { .. } => StatusCode::NOT_FOUND,
            BuddyError::DuplicateEmail(_)
            | BuddyError::AdvisorHasActiveRequests { .. }
            | BuddyError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BuddyError::Unauthorized => StatusCode::UNAUTHORIZED,
            BuddyError::Storage(_)
            | BuddyError::Csv(_)
            | BuddyError::Io(_)
            | BuddyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            BuddyError::Validation(fields) => json!({ "fields": fields }),
            BuddyError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
            BuddyError::AdvisorHasActiveRequests { count } => json!({ "count": count }),
            BuddyError::InvalidTransition { from, to } => json!({ "from": from, "to": to }),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for BuddyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
                "details": self.details(),
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for BuddyError {
    fn from(rejection: JsonRejection) -> Self {
        BuddyError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<QueryRejection> for BuddyError {
    fn from(rejection: QueryRejection) -> Self {
        BuddyError::Validation(vec![FieldError::new("query", rejection.body_text())])
    }
}

impl From<PathRejection> for BuddyError {
    fn from(rejection: PathRejection) -> Self {
        BuddyError::Validation(vec![FieldError::new("path", rejection.body_text())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(BuddyError::NoAdvisorAvailable.status(), StatusCode::BAD_REQUEST);
        assert_eq!(BuddyError::InvalidSignature.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BuddyError::not_found("payment", "order_1").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BuddyError::AdvisorHasActiveRequests { count: 3 }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(BuddyError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BuddyError::Storage("disk".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_carry_blocking_count() {
        let details = BuddyError::AdvisorHasActiveRequests { count: 2 }.details();
        assert_eq!(details["count"], 2);
    }
}
