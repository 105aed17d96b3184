//! A2S_INFO query over UDP.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::a2s::{self, ServerStatus, INFO_REQUEST, MAX_RESPONSE_LEN};
use super::{ProbeError, ProbeOutcome};

type ReadResult = io::Result<(Vec<u8>, Instant)>;

/// Probe a game server, folding every failure into [`ProbeOutcome::Down`].
pub async fn probe(address: &str, timeout: Duration) -> ProbeOutcome {
    query_server(address, timeout).await.into()
}

/// Send one info query to `address` and wait at most `timeout` for the reply.
///
/// The socket lives only for the duration of the call. A read still pending
/// when the timeout fires is aborted, which closes the socket.
pub async fn query_server(address: &str, timeout: Duration) -> Result<ServerStatus, ProbeError> {
    let target = resolve_address(address).await?;
    let socket = connect(target).await.map_err(ProbeError::Socket)?;

    let start = Instant::now();
    socket.send(&INFO_REQUEST).await.map_err(ProbeError::Write)?;

    let (tx, rx) = oneshot::channel();
    let _reader = ReadTask(tokio::spawn(read_response(socket, tx)));

    let (buf, received_at) = tokio::select! {
        result = rx => match result {
            Ok(read) => read.map_err(ProbeError::Read)?,
            Err(_) => return Err(ProbeError::Read(io::Error::other("read task dropped"))),
        },
        _ = tokio::time::sleep(timeout) => return Err(ProbeError::Timeout(timeout)),
    };

    tracing::debug!("Received {} bytes from {}", buf.len(), target);

    let mut status = a2s::decode(&buf)?;
    status.latency = received_at.duration_since(start);
    Ok(status)
}

/// Resolve `host:port` to the first socket address.
async fn resolve_address(address: &str) -> Result<SocketAddr, ProbeError> {
    let resolve_err = |reason: String| ProbeError::Resolve {
        address: address.to_string(),
        reason,
    };

    tokio::net::lookup_host(address)
        .await
        .map_err(|e| resolve_err(e.to_string()))?
        .next()
        .ok_or_else(|| resolve_err("no addresses found".to_string()))
}

/// Bind an ephemeral socket of the target's family and connect it.
async fn connect(target: SocketAddr) -> io::Result<UdpSocket> {
    let local: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };

    let socket = UdpSocket::bind(local).await?;
    socket.connect(target).await?;
    Ok(socket)
}

/// Read a single datagram and hand it over with its arrival time.
async fn read_response(socket: UdpSocket, tx: oneshot::Sender<ReadResult>) {
    let mut buf = vec![0u8; MAX_RESPONSE_LEN];
    let result = socket.recv(&mut buf).await.map(|n| {
        let received_at = Instant::now();
        buf.truncate(n);
        (buf, received_at)
    });

    // The receiver is gone once the probe has returned.
    let _ = tx.send(result);
}

/// Aborts the read task, and with it the socket, when the probe returns.
struct ReadTask(JoinHandle<()>);

impl Drop for ReadTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
