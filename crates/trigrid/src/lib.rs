//! # Trigrid
//!
//! A room server for a two-seat 3×3 grid game. Players create a room,
//! share its 6-character code out-of-band, and play over persistent
//! WebSocket connections; the server owns the board, validates every
//! move, tracks scores across rematches, and reclaims seats on
//! disconnect.
//!
//! The interesting part is the core in [`trigrid_room`]: this crate
//! adds the lobby actor that serializes dispatch, the per-connection
//! reader/writer tasks, and the accept loop.

mod error;
mod handler;
mod lobby;
mod server;

pub use error::TrigridError;
pub use server::{Server, ServerBuilder};
