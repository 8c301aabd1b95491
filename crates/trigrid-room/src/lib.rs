//! Room lifecycle and game rules for Trigrid.
//!
//! This crate is the server's core: everything with an invariant lives
//! here, and none of it knows about sockets or JSON framing.
//!
//! # Key types
//!
//! - [`Room`] — one session's state machine (board, turn, winner,
//!   seats, scores, rematch votes)
//! - [`RoomRegistry`] — owns live rooms, allocates collision-free codes
//! - [`Bindings`] — the connection→room index
//! - [`RoomError`] — the player-visible error taxonomy
//! - [`game`] — board geometry and win detection

pub mod game;

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{Bindings, RoomRegistry};
pub use room::{MoveOutcome, Phase, Player, RematchOutcome, Room, Seats};
