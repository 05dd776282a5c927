use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::get;
use axum::Router;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::services::EventBus;

#[derive(Clone)]
pub struct SseState {
    pub event_bus: Arc<EventBus>,
}

pub fn sse_router(sse_state: SseState) -> Router {
    Router::new()
        .route("/api/scan/events", get(sse_handler))
        .with_state(sse_state)
}

#[utoipa::path(
    get,
    path = "/api/scan/events",
    tag = "scan",
    responses(
        (status = 200, description = "Server-sent stream of session and registry events")
    )
)]
pub async fn sse_handler(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.event_bus.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match Event::default().event(event.name()).json_data(&event) {
            Ok(frame) => Some(Ok(frame)),
            Err(e) => {
                tracing::warn!("Dropping unserialisable {} event: {e}", event.name());
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("SSE subscriber lagged by {skipped} events");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
