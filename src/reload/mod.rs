//! Live reload.
//!
//! ```text
//! Watcher --notify_reload--> Broadcaster --try_send--> client thread --ws frame--> browser
//! ```
//!
//! - `broadcast` - subscriber registry and non-blocking fan-out
//! - `client` - per-connection delivery loop
//! - `message` - JSON message protocol
//! - `server` - WebSocket acceptor

pub mod broadcast;
mod client;
pub mod message;
pub mod server;

pub use broadcast::Broadcaster;
pub use message::ReloadMessage;
pub use server::start_ws_server;

/// Capability to tell connected clients that artifacts changed.
pub trait ReloadNotifier: Send + Sync {
    fn notify_reload(&self, reason: &str);
}
