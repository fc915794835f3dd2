//! Membership wait primitive.
//!
//! The homeserver only exposes eventual, poll-driven membership visibility;
//! there is no push notification for a specific join. So this polls:
//! refresh, test, sleep, repeat. By default it waits indefinitely, because
//! invitation acceptance is an out-of-band human/bot action with no bounded
//! latency; callers that need a bound must opt in with a timeout.
//!
//! Cancellation is dropping the future. The view is read-only, so a wait
//! abandoned mid-poll leaves nothing inconsistent behind.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::common::error::WaitError;
use crate::matrix::view::RoomStateView;

/// Block until `user_id` is a member of `room_id`.
///
/// Returns on the first poll cycle where the member is present. With
/// `timeout = Some(t)`, fails with [`WaitError::Timeout`] once `t` has
/// elapsed without success; the failure lands no later than one poll
/// interval past `t`.
pub async fn wait_for_member(
    view: &mut RoomStateView,
    room_id: &str,
    user_id: &str,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<(), WaitError> {
    let started = Instant::now();
    info!(room_id, user_id, "Waiting for member to join");

    loop {
        view.refresh().await?;

        if let Some(room) = view.find(room_id) {
            if room.has_member(user_id) {
                info!(room_id, user_id, "Member joined");
                return Ok(());
            }
        }
        debug!(room_id, user_id, "Not a member yet");

        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Err(WaitError::Timeout {
                    room_id: room_id.to_string(),
                    user_id: user_id.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                });
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}
