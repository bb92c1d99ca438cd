//! Workflow event streaming

use crate::api::rest::auth::AuthenticatedOperator;
use crate::api::rest::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Stream workflow events via SSE
pub async fn stream_events(
    State(state): State<AppState>,
    AuthenticatedOperator(operator): AuthenticatedOperator,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(operator = %operator.id, "Workflow event subscriber connected");
    let rx = state.workflows.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(envelope) => {
                let event = match Event::default().json_data(&envelope) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode workflow event");
                        Event::default().comment("encoding error")
                    }
                };
                Some((Ok(event), rx))
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Workflow event subscriber lagged");
                Some((Ok(Event::default().comment("lagged")), rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
