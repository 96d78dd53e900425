//! The receive half of the bot: a perpetual task that pulls datagrams off
//! the socket, decodes them, and applies them to the shared world state.
//!
//! Messages are applied in arrival order; the transport guarantees nothing
//! about ordering across datagrams and nothing here assumes it. Decode
//! failures drop the one frame. Read failures are logged and retried after
//! a short pause so a persistently dead socket cannot spin the log.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::wire::{self, DecodeError};
use crate::world::WorldState;

/// Matches the server's maximum frame size.
const RECV_BUFFER_LEN: usize = 1024;

const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Run the ingest loop until process exit. Never returns.
pub async fn run_ingest(socket: Arc<UdpSocket>, world: Arc<Mutex<WorldState>>) {
    let mut buf = vec![0u8; RECV_BUFFER_LEN];
    loop {
        let n = match socket.recv(&mut buf).await {
            Ok(n) => n,
            Err(err) => {
                tracing::warn!("ingest.recv.error {err}");
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                continue;
            }
        };
        if n == 0 {
            continue;
        }

        let raw = String::from_utf8_lossy(&buf[..n]);
        match wire::decode(&raw) {
            Ok(event) => {
                let mut world = world.lock().await;
                world.apply(event, Instant::now());
            }
            Err(DecodeError::UnknownMessageType(frame)) => {
                tracing::info!("ingest.message.unknown {frame}");
            }
            Err(err) => {
                tracing::warn!("ingest.decode.error {err}");
            }
        }
    }
}
