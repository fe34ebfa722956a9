//! WebSocket endpoint for realtime state synchronization.
//!
//! Identity is resolved once by the auth middleware before the upgrade;
//! connections without valid credentials never reach this handler. Each
//! connection processes its own commands sequentially, while commands from
//! different connections interleave freely.

use axum::{
    Extension,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use api_types::event::ClientEvent;

use crate::{
    dispatch::{self, Audience, Routed},
    server::ServerState,
    user,
};

pub(crate) async fn upgrade(
    ws: WebSocketUpgrade,
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Response {
    ws.on_upgrade(move |socket| serve(socket, state, user.username))
}

async fn serve(socket: WebSocket, state: ServerState, user_id: String) {
    let session_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.sessions.register(&user_id, session_id, tx).await;
    tracing::info!("session {session_id} connected for {user_id}");

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!("socket error for session {session_id}: {err}");
                break;
            }
        };
        match message {
            Message::Text(text) => {
                let event: ClientEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!("unrecognized frame from session {session_id}: {err}");
                        continue;
                    }
                };
                for routed in dispatch::handle_event(&state.engine, &user_id, event).await {
                    route(&state, &user_id, session_id, routed).await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.unregister(&user_id, session_id).await;
    writer.abort();
    tracing::info!("session {session_id} disconnected");
}

async fn route(state: &ServerState, user_id: &str, session_id: Uuid, routed: Routed) {
    match routed.audience {
        Audience::Caller => state.sessions.send_to(user_id, session_id, &routed.frame).await,
        Audience::User => state.sessions.broadcast(user_id, &routed.frame).await,
        Audience::Others => {
            state
                .sessions
                .broadcast_others(user_id, session_id, &routed.frame)
                .await
        }
    }
}
