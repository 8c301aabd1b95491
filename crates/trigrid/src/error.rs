//! Unified error type for the Trigrid server.

use trigrid_protocol::ProtocolError;
use trigrid_room::RoomError;
use trigrid_transport::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// The `#[from]` attributes auto-generate `From` impls, so `?` converts
/// layer errors automatically in the server and handler code.
#[derive(Debug, thiserror::Error)]
pub enum TrigridError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid room code).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, rule violation).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The lobby actor's mailbox is gone — the server is shutting down.
    #[error("lobby is no longer running")]
    LobbyClosed,
}
