//! Chat routes.
//!
//! - `POST /api/chat` runs the full pipeline and returns the reply body.
//! - `POST /api/chat/preview` returns the assembled turn sequence without
//!   calling the provider.
//!
//! Malformed JSON never reaches the pipeline; it is answered with the same
//! body as any other validation failure.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cyclemate_agent::{ChatReply, Preview};
use cyclemate_core::error::ValidationError;
use cyclemate_core::request::ChatRequest;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::SharedAssistant;

pub(crate) async fn chat_handler(
    State(assistant): State<SharedAssistant>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => return rejected(rejection),
        };

        info!(
            message_len = request.message.as_deref().map_or(0, str::len),
            history_len = request.history.len(),
            "Chat request received"
        );

        let reply = assistant.respond(&request).await;
        info!(
            status = reply.http_status(),
            success = reply.is_success(),
            "Chat request finished"
        );
        reply_response(&reply)
    }
    .instrument(span)
    .await
}

pub(crate) async fn preview_handler(
    State(assistant): State<SharedAssistant>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat_preview", %request_id);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => return rejected(rejection),
        };

        match assistant.preview(&request) {
            Ok(preview) => preview_response(preview),
            Err(err) => reply_response(&ChatReply::Rejected(err)),
        }
    }
    .instrument(span)
    .await
}

fn reply_response(reply: &ChatReply) -> Response {
    let status =
        StatusCode::from_u16(reply.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body())).into_response()
}

fn preview_response(preview: Preview) -> Response {
    (StatusCode::OK, Json(preview)).into_response()
}

fn rejected(rejection: JsonRejection) -> Response {
    info!(reason = %rejection.body_text(), "Rejected malformed chat body");
    let reply = ChatReply::Rejected(ValidationError::MalformedBody(rejection.body_text()));
    // Oversized bodies keep their 413.
    let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(reply.body())).into_response()
}
