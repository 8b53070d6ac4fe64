//! Live change feed over Server-Sent Events.
//!
//! Each frame carries the bus sequence as `id`, the change kind as `event`,
//! and the [`ChangeEvent`](crate::change_bus::ChangeEvent) as JSON `data`.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::Extension,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::change_bus::Notification;
use crate::services::InventoryService;

pub fn router() -> Router {
    Router::new().route("/events", get(stream_events))
}

/// GET /events
///
/// The stream ends when the bus closes. A client that falls behind misses
/// events; gaps show up in the `id` sequence.
pub async fn stream_events(
    Extension(service): Extension<InventoryService>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let subscription = service.subscribe();
    info!(subscriber = %subscription.id(), "Event stream opened");

    let stream = subscription.map(|notification| Ok(to_sse(&notification)));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

pub(crate) fn to_sse(notification: &Notification) -> SseEvent {
    let frame = SseEvent::default()
        .id(notification.sequence.to_string())
        .event(notification.event.kind.as_str());

    match serde_json::to_string(&notification.event) {
        Ok(data) => frame.data(data),
        Err(e) => {
            warn!(error = %e, sequence = notification.sequence, "Event not serializable");
            frame.comment("unserializable event")
        }
    }
}
