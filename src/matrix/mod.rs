//! Messaging-network layer: homeserver client, room state view,
//! membership wait primitive and session persistence.

pub mod client;
pub mod session;
pub mod types;
pub mod view;
pub mod wait;

pub use client::{HttpMatrixClient, MatrixApi};
pub use view::RoomStateView;
pub use wait::wait_for_member;
