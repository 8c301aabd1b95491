//! Room storage, code allocation, and the connection→room index.
//!
//! Both maps that used to be ambient globals in servers like this one —
//! code→room and connection→room — live here as plain owned structs.
//! The dispatch layer holds one instance of each; tests construct their
//! own isolated instances directly.

use std::collections::HashMap;

use rand::Rng;
use trigrid_protocol::{ConnectionId, RoomCode};

use crate::{Room, RoomError};

/// Candidate codes drawn before allocation gives up.
const MAX_CODE_ATTEMPTS: usize = 30;

/// Owns every live room, keyed by room code.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a collision-free room code using the thread-local RNG.
    pub fn allocate(&self) -> Result<RoomCode, RoomError> {
        self.allocate_with(&mut rand::rng())
    }

    /// Allocates a collision-free room code, drawing candidates from
    /// `rng`. Retries on collision up to [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// # Errors
    /// Returns [`RoomError::AllocationExhausted`] when every candidate
    /// collided — a transient capacity signal surfaced to the creating
    /// connection, never retried server-side.
    pub fn allocate_with<R: Rng>(&self, rng: &mut R) -> Result<RoomCode, RoomError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let mut indices = [0u8; RoomCode::LEN];
            for slot in &mut indices {
                *slot = rng.random_range(0..RoomCode::ALPHABET.len() as u8);
            }
            let code = RoomCode::from_indices(indices);
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
            tracing::debug!(room = %code, "room code collision, retrying");
        }
        Err(RoomError::AllocationExhausted)
    }

    /// Stores a room under `code`, replacing any previous occupant.
    pub fn insert(&mut self, code: RoomCode, room: Room) {
        self.rooms.insert(code, room);
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Removes and returns the room under `code`.
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// The connection→room index. A connection is bound to at most one room
/// at a time: bound on create/join, unbound on disconnect.
#[derive(Debug, Default)]
pub struct Bindings {
    rooms: HashMap<ConnectionId, RoomCode>,
}

impl Bindings {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `conn` to `code`.
    ///
    /// # Errors
    /// Returns [`RoomError::AlreadyBound`] if `conn` is already bound —
    /// a connection never silently moves between rooms.
    pub fn bind(&mut self, conn: ConnectionId, code: RoomCode) -> Result<(), RoomError> {
        if self.rooms.contains_key(&conn) {
            return Err(RoomError::AlreadyBound(conn));
        }
        self.rooms.insert(conn, code);
        Ok(())
    }

    /// The room `conn` is bound to, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&RoomCode> {
        self.rooms.get(&conn)
    }

    /// Removes the binding for `conn`, returning the room it held.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<RoomCode> {
        self.rooms.remove(&conn)
    }

    pub fn is_bound(&self, conn: ConnectionId) -> bool {
        self.rooms.contains_key(&conn)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
