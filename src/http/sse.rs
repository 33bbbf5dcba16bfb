//! Server-push stream for `GET /mcp`

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::{stream, Stream, StreamExt};
use serde_json::json;
use tokio::time::{interval_at, Instant};
use tokio_stream::wrappers::IntervalStream;

use super::server::AppState;
use crate::mcp::{methods, protocol::JSONRPC_VERSION};

/// Default spacing between heartbeat comments
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);

/// First frame of every push stream
pub fn initialized_event() -> Event {
    let notification = json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": methods::INITIALIZED,
    });
    Event::default()
        .event("message")
        .data(notification.to_string())
}

/// `GET /mcp`: one `initialized` notification, then heartbeat comments.
///
/// The heartbeat timer and the stream guard live inside the stream; when the
/// client disconnects axum drops the stream and both go with it.
pub async fn mcp_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = state.health.stream_guard();
    let period = state.heartbeat;

    let heartbeats = IntervalStream::new(interval_at(Instant::now() + period, period))
        .map(|_| Event::default().comment("heartbeat"));

    let events = stream::once(async { initialized_event() })
        .chain(heartbeats)
        .map(move |event| {
            let _held = &guard;
            Ok(event)
        });

    tracing::info!("Push stream started");
    Sse::new(events)
}
