// src/dashboard/routes.rs

use futures::{SinkExt, StreamExt};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use warp::{
    http::StatusCode,
    ws::{Message, WebSocket, Ws},
    Filter, Rejection, Reply,
};

use super::page;
use super::state::DashboardState;

/// All dashboard routes: the page itself, the current snapshot, the manual
/// refresh trigger, and the websocket push channel.
pub fn routes(
    state: Arc<DashboardState>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(page::INDEX_HTML));

    let snapshot = warp::path("state")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: Arc<DashboardState>| warp::reply::json(&state.snapshot()));

    let refresh = warp::path("refresh")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(refresh_handler);

    let ws = warp::path("ws")
        .and(warp::ws())
        .and(warp::header::optional::<String>("origin"))
        .and(with_state(state))
        .and_then(ws_handler);

    index.or(snapshot).or(refresh).or(ws)
}

fn with_state(
    state: Arc<DashboardState>,
) -> impl Filter<Extract = (Arc<DashboardState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn refresh_handler(state: Arc<DashboardState>) -> Result<impl Reply, Rejection> {
    let snapshot = state.refresh().await;
    Ok(warp::reply::json(&snapshot))
}

/// Upgrade to the push channel. When an allowed origin is configured, any
/// other `Origin` header is refused before the upgrade.
async fn ws_handler(
    ws: Ws,
    origin: Option<String>,
    state: Arc<DashboardState>,
) -> Result<Box<dyn Reply>, Rejection> {
    if let Some(allowed) = state.allowed_ws_origin() {
        if origin.as_deref() != Some(allowed) {
            warn!(?origin, "websocket origin rejected");
            return Ok(Box::new(warp::reply::with_status(
                "origin not allowed",
                StatusCode::FORBIDDEN,
            )));
        }
    }
    Ok(Box::new(
        ws.on_upgrade(move |socket| push_updates(socket, state)),
    ))
}

/// Send the current snapshot, then forward every completed refresh until the
/// client goes away.
async fn push_updates(socket: WebSocket, state: Arc<DashboardState>) {
    let (mut tx, mut rx) = socket.split();
    let mut updates = state.subscribe();

    if let Ok(text) = serde_json::to_string(&state.snapshot()) {
        if tx.send(Message::text(text)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(snapshot) => {
                    let text = match serde_json::to_string(&snapshot) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("serializing snapshot: {}", e);
                            continue;
                        }
                    };
                    if tx.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = rx.next() => match incoming {
                Some(Ok(msg)) if msg.is_close() => break,
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
    debug!("websocket subscriber disconnected");
}
