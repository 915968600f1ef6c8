//! Connectionless echo loop.
//!
//! Every datagram gets a reply carrying the canned body; the datagram's own
//! content is never inspected. UDP traffic is deliberately excluded from
//! scoreboard accounting since there is no connection to count.

use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::identity::ServerIdentity;

/// MTU-sized receive buffer. Larger datagrams are truncated, which is fine
/// since the payload is discarded anyway.
const RECV_BUFFER: usize = 1500;

/// Run the receive/reply loop on an already-bound socket.
///
/// Returns the first receive or send error. The binary runs this on its main
/// execution path, so a returned error terminates the process.
pub async fn run(socket: UdpSocket, identity: Arc<ServerIdentity>) -> Result<(), std::io::Error> {
    let addr = socket.local_addr()?;
    tracing::info!(address = %addr, "UDP listener starting");

    let mut buf = [0u8; RECV_BUFFER];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                tracing::error!(error = %e, "UDP receive failed");
                return Err(e);
            }
        };
        tracing::debug!(peer = %peer, bytes = len, "Datagram received");

        if let Err(e) = socket.send_to(identity.body().as_bytes(), peer).await {
            tracing::error!(peer = %peer, error = %e, "UDP reply failed");
            return Err(e);
        }
    }
}
