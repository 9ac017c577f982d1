//! Server-push change feed (SSE)
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/events | GET | committed tab events and song updates |
//!
//! The feed is a notification layer over the broadcast channel. A client
//! that lags far enough to drop entries receives a `lagged` event and is
//! expected to re-read the query endpoints.

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(events))
}

async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_changes();

    let stream = BroadcastStream::new(rx).filter_map(|entry| match entry {
        Ok(change) => match Event::default().json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize change feed entry");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged");
            Some(Ok(Event::default().event("lagged").data(skipped.to_string())))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
