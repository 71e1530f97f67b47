//! `/chat/*`: stateless asking and the per-user server-side transcript.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use support_flows::{BotResponseResult, selector::GENERIC_FAILURE};
use tracing::{debug, error, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    middleware_layer::auth::AuthUser,
    routes::chat::chat_request::{AskRequest, MessagesResponse, SubmitRequest, SubmitResponse},
};

/// Handler: POST /chat/ask (bearer)
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/chat/ask \
///   -H "authorization: Bearer $TOKEN" \
///   -H 'content-type: application/json' \
///   -d '{"question":"Does the Smart Thermostat X1000 support WiFi?"}'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AskRequest>,
) -> AppResult<ApiResponse<BotResponseResult>> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(AppError::EmptyQuestion);
    }
    debug!(email = %user.email, history_len = body.history.len(), "ask");

    let result = state.selector.select_response(question, &body.history).await;
    Ok(ApiResponse::success(result))
}

/// Handler: POST /chat/messages (bearer)
///
/// Appends the question to the caller's transcript, answers it with the
/// earlier messages as history and appends the reply. The answer is computed
/// on a detached task so the transcript is completed even if the client
/// disconnects. A crashed answer task still closes the turn with the generic
/// apology.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SubmitRequest>,
) -> AppResult<ApiResponse<SubmitResponse>> {
    let session = state.chat_session(&user.email).await;

    let (turn, user_message) = {
        let mut chat = session.lock().await;
        let turn = chat.begin_turn(&body.question)?;
        let user_message = chat
            .messages()
            .last()
            .cloned()
            .ok_or_else(|| AppError::Internal("user message was not recorded".into()))?;
        (turn, user_message)
    };

    let selector = state.selector.clone();
    let task_session = session.clone();
    let answered = tokio::spawn(async move {
        let result = selector
            .select_response(&turn.question, &turn.history)
            .await;
        task_session.lock().await.complete_turn(&result)
    })
    .await;

    let bot_message = match answered {
        Ok(completed) => completed?,
        Err(e) => {
            // The task died before closing the turn; close it here.
            error!(email = %user.email, error = %e, "answer task failed");
            session
                .lock()
                .await
                .complete_turn(&BotResponseResult::failed(GENERIC_FAILURE))?
        }
    };

    info!(
        email = %user.email,
        has_confidence = bot_message.confidence.is_some(),
        "chat turn completed"
    );
    Ok(ApiResponse::success(SubmitResponse {
        user_message,
        bot_message,
    }))
}

/// Handler: GET /chat/messages (bearer)
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResponse<MessagesResponse> {
    let session = state.chat_session(&user.email).await;
    let messages = session.lock().await.messages().to_vec();
    ApiResponse::success(MessagesResponse { messages })
}

/// Handler: DELETE /chat/messages (bearer)
///
/// # Errors
/// [`AppError::Session`] with `Busy` while a reply is still being computed.
pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<ApiResponse<MessagesResponse>> {
    let session = state.chat_session(&user.email).await;
    let mut chat = session.lock().await;
    if chat.is_awaiting_reply() {
        return Err(support_flows::SessionError::Busy.into());
    }
    chat.clear();
    Ok(ApiResponse::success(MessagesResponse {
        messages: Vec::new(),
    }))
}
