//! Real-time guest notifications over persistent WebSocket connections.
//!
//! This crate owns the live connection of every connected guest and lets the
//! rest of the platform push a message to a guest and learn whether it was
//! written.
//!
//! # Architecture
//!
//! - **Single connection per guest**: a guest that reconnects supersedes its
//!   previous connection, which is torn down before the new one is used.
//! - **Connection actor**: every connection is driven by a write loop (the
//!   only context that writes, heartbeats included) and a read loop (detects
//!   disconnects and discards inbound content).
//! - **Synchronous delivery**: `Messenger::send` enqueues a delivery task and
//!   waits for the write loop to report that task's outcome. A slow guest slows
//!   its caller instead of buffering without bound.
//! - **Ephemeral messages**: nothing is queued for offline guests.
//!
//! # Message Flow
//!
//! 1. A guest opens a WebSocket on `/guests/{guest_id}/ws`
//! 2. The web layer hands the upgraded socket to `Messenger::open_connection`
//! 3. A request handler publishes a domain event (e.g. guest checked in)
//! 4. `GuestEventHandler` turns it into a `GuestMessage` and calls
//!    `Messenger::send`
//! 5. The guest's write loop writes the JSON frame and replies to the caller
//!
//! # Example: Sending a message
//!
//! ```rust,ignore
//! use messenger::GuestMessage;
//! use serde_json::json;
//!
//! let message = GuestMessage::new("Check in", json!({"nric": "1234", "name": "Jim Bob"}))?;
//! app_state.messenger.send(&guest_id, message).await?;
//! ```
//!
//! # Modules
//!
//! - `actor`: connection actor loops and timing settings
//! - `connection`: guest registry and type-safe ConnectionId
//! - `manager`: the public `Messenger` API
//! - `message`: `GuestMessage` and delivery tasks
//! - `transport`: duplex connection contract and the axum WebSocket adapter

pub mod actor;
pub mod connection;
pub mod domain_event_handler;
pub mod error;
pub mod manager;
pub mod message;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use actor::ConnectionSettings;
pub use connection::GuestId;
pub use domain_event_handler::GuestEventHandler;
pub use error::{Error, ErrorKind};
pub use manager::Messenger;
pub use message::GuestMessage;
