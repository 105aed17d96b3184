//! Probe module for game server status queries.
//!
//! Speaks the A2S_INFO protocol over UDP.

pub mod a2s;
mod udp;

pub use a2s::{DecodeError, ServerStatus};
pub use udp::*;

use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("can not resolve {address:?}: {reason}")]
    Resolve { address: String, reason: String },
    #[error("can not create UDP socket: {0}")]
    Socket(std::io::Error),
    #[error("can not write datagram: {0}")]
    Write(std::io::Error),
    #[error("error reading from socket: {0}")]
    Read(std::io::Error),
    #[error("server timed out after {0:?}")]
    Timeout(Duration),
    #[error("can not parse response: {0}")]
    Decode(#[from] DecodeError),
}

/// Result of probing a single target.
#[derive(Debug)]
pub enum ProbeOutcome {
    Up(ServerStatus),
    Down(ProbeError),
}

impl From<Result<ServerStatus, ProbeError>> for ProbeOutcome {
    fn from(result: Result<ServerStatus, ProbeError>) -> Self {
        match result {
            Ok(status) => ProbeOutcome::Up(status),
            Err(e) => ProbeOutcome::Down(e),
        }
    }
}
