//! Read-only projection of the current room/member state.

use std::sync::Arc;

use tracing::debug;

use crate::common::error::MatrixResult;
use crate::common::types::RoomSnapshot;
use crate::matrix::client::MatrixApi;

/// Cached view of the rooms the session has joined.
///
/// `refresh` performs one sync round-trip and replaces the whole cache;
/// `rooms` reads the cache without touching the network. There is no retry
/// at this layer - retry policy belongs to the callers that poll.
pub struct RoomStateView {
    api: Arc<dyn MatrixApi>,
    rooms: Vec<RoomSnapshot>,
}

impl RoomStateView {
    pub fn new(api: Arc<dyn MatrixApi>) -> Self {
        Self {
            api,
            rooms: Vec::new(),
        }
    }

    /// One sync round-trip; the cached snapshot set is replaced atomically.
    pub async fn refresh(&mut self) -> MatrixResult<&[RoomSnapshot]> {
        let rooms = self.api.sync().await?;
        debug!(rooms = rooms.len(), "Room state refreshed");
        self.rooms = rooms;
        Ok(&self.rooms)
    }

    /// Cached snapshots from the last refresh; no network round-trip.
    pub fn rooms(&self) -> &[RoomSnapshot] {
        &self.rooms
    }

    pub fn find(&self, room_id: &str) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|r| r.room_id == room_id)
    }

    pub async fn invite(&self, room_id: &str, user_id: &str) -> MatrixResult<()> {
        self.api.invite(room_id, user_id).await
    }

    pub async fn send_text(&self, room_id: &str, body: &str) -> MatrixResult<()> {
        self.api.send_text(room_id, body).await
    }

    pub async fn leave(&self, room_id: &str) -> MatrixResult<()> {
        self.api.leave(room_id).await
    }
}
