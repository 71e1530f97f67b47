//! JSON envelope shared by every endpoint.
//!
//! Success: `{"success":true,"data":...}`.
//! Failure: `{"success":false,"error":{"code":"SESSION_BUSY","message":...}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Machine-readable failure codes clients can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body could not be parsed, or an auth field is invalid.
    BadRequest,
    /// Body parsed but does not fit the request type.
    UnprocessableEntity,
    /// Blank chat question.
    EmptyQuestion,
    /// Missing/expired bearer token or wrong credentials.
    Unauthorized,
    EmailTaken,
    /// A reply for this user's transcript is still being computed.
    SessionBusy,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::EmptyQuestion => StatusCode::BAD_REQUEST,
            ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::EmailTaken | ErrorCode::SessionBusy => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// Pointer into a rejected request body.
#[derive(Serialize)]
pub struct ApiErrorDetail {
    /// Field path like `question` or `history[2].role`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(
        code: ErrorCode,
        message: impl Into<String>,
        details: Vec<ApiErrorDetail>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
                details,
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    /// Failures use their code's status; successes are `200`.
    fn into_response(self) -> Response {
        let status = self
            .error
            .as_ref()
            .map_or(StatusCode::OK, |e| e.code.status());
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_code_and_skips_empty_parts() {
        let env = ApiResponse::failure(ErrorCode::SessionBusy, "busy", Vec::new());
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": false, "error": {"code": "SESSION_BUSY", "message": "busy"}})
        );
    }

    #[test]
    fn failure_response_takes_status_from_code() {
        let resp = ApiResponse::failure(ErrorCode::EmailTaken, "taken", Vec::new()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = ApiResponse::success(json!({})).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
