//! Wire protocol for Trigrid.
//!
//! This crate defines the language the browser client and the server
//! speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`RoomSnapshot`],
//!   the identity newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from frame bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing either.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! core (game semantics). It knows nothing about connections, seats, or
//! turn order — only about shapes on the wire.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientCommand, ConnectionId, Mark, Outcome, RoomCode, RoomSnapshot,
    ScoresView, SeatView, SeatsView, ServerEvent,
};
