//! Error types for the room layer.
//!
//! Every variant's display text is what the offending connection sees
//! in an `error_message` event, so the wording is written for players,
//! not for machines. Inputs in the silent-ignore class (late or
//! malformed moves, premature rematch votes) are not errors at all —
//! they are represented by `Ignored` outcomes and produce no traffic.

use trigrid_protocol::ConnectionId;

/// Errors that can occur during room operations. All are surfaced only
/// to the originating connection; none are fatal to the server.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The code space was saturated after bounded retries. A transient
    /// capacity problem: the creator may simply try again.
    #[error("unable to create a room right now, try again")]
    AllocationExhausted,

    /// No room exists under the given code. Carries the raw string the
    /// player typed, which may not even parse as a code.
    #[error("room {0:?} not found")]
    NotFound(String),

    /// A join was attempted on a room whose `O` seat is filled.
    #[error("room is already full")]
    SeatOccupied,

    /// The mover's seat mark does not equal the room's current turn.
    #[error("not your turn")]
    NotYourTurn,

    /// The targeted cell already holds a mark.
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),

    /// The connection is already seated in some room and may not create
    /// or join another.
    #[error("{0} is already in a room")]
    AlreadyBound(ConnectionId),
}
