//! Request and response types for the HTTP API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::routing::{Classifier, RoutingDecision, ScoreBreakdown};

/// Body of `POST /api/query` and `POST /api/classify`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    /// Trimmed query text, rejecting blank input.
    pub fn text(&self) -> Result<&str, ApiError> {
        let text = self.query.trim();
        if text.is_empty() {
            return Err(ApiError::bad_request("Query cannot be empty"));
        }
        Ok(text)
    }
}

/// Routing decision with its evidence.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    #[serde(flatten)]
    pub decision: RoutingDecision,
    pub multi_source: bool,
    pub breakdown: ScoreBreakdown,
}

impl ClassifyResponse {
    /// Classify `text`. `multi_source` reports fan-out only when
    /// `fan_out_enabled` is set.
    pub fn new(classifier: &Classifier, text: &str, fan_out_enabled: bool) -> Self {
        Self {
            decision: classifier.classify(text),
            multi_source: fan_out_enabled && classifier.is_multi_source(text),
            breakdown: classifier.explain(text),
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                code: Some("invalid_request_error".to_string()),
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(&rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_rejected() {
        let request = QueryRequest {
            query: "   ".to_string(),
        };
        let err = request.text().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error.message, "Query cannot be empty");
    }

    #[test]
    fn test_query_text_is_trimmed() {
        let request = QueryRequest {
            query: "  TX tax rate\n".to_string(),
        };
        assert_eq!(request.text().unwrap(), "TX tax rate");
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(ApiError::bad_request("bad")).unwrap();
        assert_eq!(json["error"]["message"], "bad");
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["code"], "invalid_request_error");
    }

    #[test]
    fn test_classify_response_respects_fan_out_switch() {
        let classifier = Classifier::default();
        let text = "Tesla registrations and sales tax in Texas";
        assert!(ClassifyResponse::new(&classifier, text, true).multi_source);
        assert!(!ClassifyResponse::new(&classifier, text, false).multi_source);
    }
}
