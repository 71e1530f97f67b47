//! Rewrites axum's plain-text body rejections (400/422) into the JSON
//! envelope and stamps every response with `X-Request-Id`.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse, ErrorCode};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Largest rejection body we are willing to buffer.
const MAX_REJECTION_BYTES: usize = 64 * 1024;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_REJECTION_BYTES)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

/// Extracts the field name from serde messages such as "missing field `question`".
fn field_from_serde_msg(msg: &str) -> Option<String> {
    let start = msg.find('`')? + 1;
    let len = msg[start..].find('`')?;
    Some(msg[start..start + len].to_string())
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("missing field") {
        Some("Add the missing field to the JSON body.".into())
    } else if msg.contains("unknown variant") {
        Some("Conversation roles are `user` or `model`.".into())
    } else if msg.contains("Content-Type") {
        Some("Send the body with `Content-Type: application/json`.".into())
    } else if msg.contains("expected a sequence") {
        Some("Expected an array for this field.".into())
    } else {
        None
    }
}

fn ensure_request_id(headers: &mut axum::http::HeaderMap) {
    let present = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| !v.trim().is_empty());
    if present {
        return;
    }
    if let Ok(v) = HeaderValue::from_str(&format!("req-{}", Uuid::new_v4())) {
        headers.insert(REQUEST_ID_HEADER, v);
    }
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let (mut parts, body) = res.into_parts();
    ensure_request_id(&mut parts.headers);

    // Only plain-text 400/422 bodies are extractor rejections.
    let rejection = (status == StatusCode::BAD_REQUEST
        || status == StatusCode::UNPROCESSABLE_ENTITY)
        && !is_json(&parts);
    if !rejection {
        return Response::from_parts(parts, body);
    }

    let (mut parts, bytes) = take_body(Response::from_parts(parts, body)).await;
    let original = String::from_utf8_lossy(&bytes);

    let detail = ApiErrorDetail {
        path: field_from_serde_msg(&original),
        hint: hint_for(&original),
    };
    let envelope = ApiResponse::failure(
        if status == StatusCode::BAD_REQUEST {
            ErrorCode::BadRequest
        } else {
            ErrorCode::UnprocessableEntity
        },
        original.trim(),
        vec![detail],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_is_taken_from_backticks() {
        assert_eq!(
            field_from_serde_msg(
                "Failed to deserialize the JSON body into the target type: missing field `question` at line 1 column 2"
            ),
            Some("question".to_string())
        );
        assert_eq!(field_from_serde_msg("no ticks here"), None);
    }

    #[test]
    fn hints_cover_common_rejections() {
        assert!(hint_for("missing field `email`").is_some());
        assert!(hint_for("unknown variant `bot`, expected `user` or `model`").is_some());
        assert!(hint_for("something else").is_none());
    }
}
