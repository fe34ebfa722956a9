//! Live connection registry and fan-out.
//!
//! Each connection registers an unbounded sender for pre-serialized reply
//! frames; a slow socket never blocks the handler that produced an update.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc::UnboundedSender};
use uuid::Uuid;

/// Routes reply frames to the live sessions of a user.
#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Arc<Mutex<HashMap<String, HashMap<Uuid, UnboundedSender<String>>>>>,
}

impl SessionHub {
    pub async fn register(&self, user_id: &str, session_id: Uuid, tx: UnboundedSender<String>) {
        let mut guard = self.inner.lock().await;
        guard
            .entry(user_id.to_string())
            .or_default()
            .insert(session_id, tx);
    }

    pub async fn unregister(&self, user_id: &str, session_id: Uuid) {
        let mut guard = self.inner.lock().await;
        if let Some(sessions) = guard.get_mut(user_id) {
            sessions.remove(&session_id);
            if sessions.is_empty() {
                guard.remove(user_id);
            }
        }
    }

    /// Sends a frame to every live session of `user_id`.
    pub async fn broadcast(&self, user_id: &str, frame: &str) {
        self.send_where(user_id, frame, |_| true).await;
    }

    /// Sends a frame to every session of `user_id` except `sender`.
    pub async fn broadcast_others(&self, user_id: &str, sender: Uuid, frame: &str) {
        self.send_where(user_id, frame, |id| *id != sender).await;
    }

    /// Sends a frame to one session only.
    pub async fn send_to(&self, user_id: &str, session_id: Uuid, frame: &str) {
        self.send_where(user_id, frame, |id| *id == session_id).await;
    }

    async fn send_where(&self, user_id: &str, frame: &str, keep: impl Fn(&Uuid) -> bool) {
        let guard = self.inner.lock().await;
        let Some(sessions) = guard.get(user_id) else {
            return;
        };
        for (id, tx) in sessions {
            // A closed receiver just means the session is tearing down.
            if keep(id) && tx.send(frame.to_string()).is_err() {
                tracing::debug!("dropping frame for closed session {id}");
            }
        }
    }
}
