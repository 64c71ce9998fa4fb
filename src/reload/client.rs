//! Per-client WebSocket delivery.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, select};
use tungstenite::protocol::Message;
use tungstenite::{Error as WsError, WebSocket};

use super::broadcast::Broadcaster;
use super::message::ReloadMessage;
use crate::core::is_shutdown;

/// How often an idle client is checked for disconnect and shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Serve one client until it disconnects or the process shuts down.
///
/// The handshake and the `connected` frame happen before subscribing, so a
/// client that fails to connect never enters the registry.
pub fn serve_client(stream: TcpStream, broadcaster: Arc<Broadcaster<ReloadMessage>>) {
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("reload"; "handshake failed: {}", e);
            return;
        }
    };

    if let Err(e) = send(&mut ws, &ReloadMessage::Connected) {
        crate::debug!("reload"; "failed to send connected message: {}", e);
        return;
    }
    let _ = ws.get_ref().set_nonblocking(true);

    let subscription = broadcaster.subscribe();
    crate::debug!("reload"; "client {} subscribed (total: {})", subscription.id(), broadcaster.len());

    let ticker = channel::tick(POLL_INTERVAL);
    loop {
        select! {
            recv(subscription.rx) -> msg => {
                let Ok(msg) = msg else { break };
                if let Err(e) = send(&mut ws, &msg) {
                    crate::debug!("reload"; "client {} gone: {}", subscription.id(), e);
                    break;
                }
            }
            recv(ticker) -> _ => {
                if is_shutdown() || !is_alive(&mut ws) {
                    break;
                }
            }
        }
    }

    let _ = ws.close(None);
    let _ = ws.flush();
    crate::debug!("reload"; "client {} unsubscribed", subscription.id());
    broadcaster.unsubscribe(subscription);
}

/// Write one message frame, tolerating a full socket buffer.
fn send(ws: &mut WebSocket<TcpStream>, msg: &ReloadMessage) -> Result<(), WsError> {
    ws.send(Message::Text(msg.to_json().into())).or_else(would_block_ok)
}

/// Drain pending client frames and flush pending writes.
fn is_alive(ws: &mut WebSocket<TcpStream>) -> bool {
    loop {
        match ws.read() {
            Ok(Message::Close(_)) => return false,
            Ok(_) => continue,
            Err(WsError::Io(e)) if e.kind() == ErrorKind::WouldBlock => break,
            Err(_) => return false,
        }
    }
    ws.flush().or_else(would_block_ok).is_ok()
}

fn would_block_ok(err: WsError) -> Result<(), WsError> {
    match err {
        WsError::Io(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
        err => Err(err),
    }
}
