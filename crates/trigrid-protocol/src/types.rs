//! Core wire types for the Trigrid protocol.
//!
//! Everything in this module travels between the browser client and the
//! server as JSON, one message per WebSocket frame. Inbound frames decode
//! to [`ClientCommand`], outbound frames encode from [`ServerEvent`].
//! Both are internally tagged (`#[serde(tag = "type")]`) so the client
//! can switch on a plain `type` field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Transport-assigned alias for one connected client.
///
/// Allocated when a connection is accepted and never reused for the
/// lifetime of the process. Seat bindings and rematch votes are keyed by
/// this identity, which is all the "authentication" the server does:
/// a move is valid only if it arrives on the connection bound to the
/// seat whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Public 6-character identifier players use to rendezvous in a room.
///
/// Codes are drawn from a 32-symbol alphabet that excludes `0`, `O`,
/// `1`, and `I` — they are read aloud or typed from another screen, so
/// visually ambiguous glyphs are left out. The inner string is always
/// [`Self::LEN`] characters from [`Self::ALPHABET`]; the only ways to
/// construct one are [`RoomCode::from_indices`] (used by the allocator)
/// and [`FromStr`], which validates and uppercases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Code length, in characters.
    pub const LEN: usize = 6;

    /// The approved alphabet. 32 symbols, no `0/O/1/I`.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Builds a code from alphabet indices. Indices are reduced modulo
    /// the alphabet size, so any six bytes produce a valid code.
    pub fn from_indices(indices: [u8; Self::LEN]) -> Self {
        let code = indices
            .iter()
            .map(|&i| Self::ALPHABET[usize::from(i) % Self::ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    /// Parses a code typed by a player: uppercases, then checks length
    /// and alphabet membership.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != Self::LEN
            || !code.bytes().all(|b| Self::ALPHABET.contains(&b))
        {
            return Err(ProtocolError::InvalidRoomCode(input.to_string()));
        }
        Ok(Self(code))
    }
}

// Deserializing through FromStr keeps the alphabet invariant: a code
// that arrives over the wire is either valid or a decode error.
impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Marks and outcomes
// ---------------------------------------------------------------------------

/// A turn symbol: the `X` seat moves first.
///
/// Serializes as the bare strings `"X"` / `"O"`, which is what the
/// client renders directly into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The opposing mark.
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

/// The result of a finished round: a winning mark, or a draw.
///
/// A room's `winner` field is `Option<Outcome>` — `None` while the round
/// is still being played. On the wire this is `"X"`, `"O"`, `"draw"`,
/// or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl Outcome {
    /// The mark that won, or `None` for a draw.
    pub fn winning_mark(self) -> Option<Mark> {
        match self {
            Outcome::X => Some(Mark::X),
            Outcome::O => Some(Mark::O),
            Outcome::Draw => None,
        }
    }
}

impl From<Mark> for Outcome {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Outcome::X,
            Mark::O => Outcome::O,
        }
    }
}

// ---------------------------------------------------------------------------
// State snapshot
// ---------------------------------------------------------------------------

/// One seat as shown to clients. The connection identity stays
/// server-side; clients only see the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub name: String,
}

/// Both seats. An empty seat is `null` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatsView {
    pub x: Option<SeatView>,
    pub o: Option<SeatView>,
}

/// Accumulated round wins per seat. Draws increment neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoresView {
    pub x: u32,
    pub o: u32,
}

/// A full snapshot of one room, broadcast after every accepted
/// transition. Clients replace their local view wholesale rather than
/// patching, so the snapshot carries everything they render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_code: RoomCode,
    /// Row-major 3×3 board; an unclaimed cell is `null`.
    pub board: [Option<Mark>; 9],
    pub turn: Mark,
    pub winner: Option<Outcome>,
    pub players: SeatsView,
    pub scores: ScoresView,
    /// Count of rematch votes recorded for the current terminal state.
    pub rematch_votes: usize,
}

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// This is a closed set: dispatch is a single exhaustive `match`, so a
/// new command is a compile-visible change everywhere it must be
/// handled. `room_code` fields are raw strings — players type codes by
/// hand, and normalization (uppercasing, validation) happens at the
/// dispatch boundary, not in serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Allocate a room and take the `X` seat.
    CreateRoom { name: Option<String> },

    /// Take the `O` seat in an existing room.
    JoinRoom {
        room_code: String,
        name: Option<String>,
    },

    /// Claim a board cell. `index` is row-major 0–8; out-of-range
    /// values are ignored without a reply.
    MakeMove { room_code: String, index: usize },

    /// Vote for a new round after the current one is decided.
    RequestRematch { room_code: String },
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Everything the server sends back, unicast or room-broadcast.
///
/// `state_update` and `round_reset` carry the same flattened snapshot;
/// the distinct tag is how clients tell a fresh round (clear the grid,
/// drop rematch UI) from an incremental update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Unicast to a creator or joiner once they hold a seat.
    RoomJoined {
        room_code: RoomCode,
        mark: Mark,
        state: RoomSnapshot,
    },

    /// Room broadcast after an accepted transition.
    StateUpdate {
        #[serde(flatten)]
        state: RoomSnapshot,
    },

    /// Room broadcast when a rematch consensus resets the board.
    RoundReset {
        #[serde(flatten)]
        state: RoomSnapshot,
    },

    /// Unicast; human-readable, never machine-parsed.
    ErrorMessage { message: String },

    /// Room broadcast when a seat is vacated by a disconnect.
    PlayerLeft { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client switches on exact JSON shapes, so these tests pin the
    //! serde representation of every wire type: tag names, field names,
    //! and the `"X"` / `"draw"` / `null` literals the UI renders.

    use super::*;

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            room_code: "K7M3XQ".parse().unwrap(),
            board: [None; 9],
            turn: Mark::X,
            winner: None,
            players: SeatsView {
                x: Some(SeatView { name: "Alice".into() }),
                o: None,
            },
            scores: ScoresView { x: 0, o: 0 },
            rematch_votes: 0,
        }
    }

    // =====================================================================
    // RoomCode
    // =====================================================================

    #[test]
    fn test_room_code_parse_uppercases() {
        let code: RoomCode = "k7m3xq".parse().unwrap();
        assert_eq!(code.as_str(), "K7M3XQ");
    }

    #[test]
    fn test_room_code_parse_trims_whitespace() {
        let code: RoomCode = " K7M3XQ ".parse().unwrap();
        assert_eq!(code.as_str(), "K7M3XQ");
    }

    #[test]
    fn test_room_code_parse_rejects_wrong_length() {
        assert!("K7M3X".parse::<RoomCode>().is_err());
        assert!("K7M3XQA".parse::<RoomCode>().is_err());
        assert!("".parse::<RoomCode>().is_err());
    }

    #[test]
    fn test_room_code_parse_rejects_ambiguous_glyphs() {
        for bad in ["K7M3X0", "K7M3XO", "K7M3X1", "K7M3XI"] {
            assert!(bad.parse::<RoomCode>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_room_code_alphabet_has_32_unambiguous_symbols() {
        assert_eq!(RoomCode::ALPHABET.len(), 32);
        for forbidden in [b'0', b'O', b'1', b'I'] {
            assert!(!RoomCode::ALPHABET.contains(&forbidden));
        }
    }

    #[test]
    fn test_room_code_from_indices_wraps_modulo_alphabet() {
        let a = RoomCode::from_indices([0, 1, 2, 3, 4, 5]);
        assert_eq!(a.as_str(), "ABCDEF");
        // 32 wraps back to index 0.
        let b = RoomCode::from_indices([32, 33, 34, 35, 36, 37]);
        assert_eq!(b.as_str(), "ABCDEF");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let code: RoomCode = "K7M3XQ".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"K7M3XQ\"");
    }

    #[test]
    fn test_room_code_deserialize_validates() {
        let ok: Result<RoomCode, _> = serde_json::from_str("\"k7m3xq\"");
        assert_eq!(ok.unwrap().as_str(), "K7M3XQ");
        let bad: Result<RoomCode, _> = serde_json::from_str("\"OOPS\"");
        assert!(bad.is_err());
    }

    // =====================================================================
    // Mark / Outcome
    // =====================================================================

    #[test]
    fn test_mark_other_flips() {
        assert_eq!(Mark::X.other(), Mark::O);
        assert_eq!(Mark::O.other(), Mark::X);
    }

    #[test]
    fn test_mark_serializes_as_bare_letter() {
        assert_eq!(serde_json::to_string(&Mark::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Mark::O).unwrap(), "\"O\"");
    }

    #[test]
    fn test_outcome_draw_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
        assert_eq!(serde_json::to_string(&Outcome::X).unwrap(), "\"X\"");
    }

    #[test]
    fn test_outcome_winning_mark() {
        assert_eq!(Outcome::X.winning_mark(), Some(Mark::X));
        assert_eq!(Outcome::O.winning_mark(), Some(Mark::O));
        assert_eq!(Outcome::Draw.winning_mark(), None);
    }

    // =====================================================================
    // ClientCommand — one shape test per variant
    // =====================================================================

    #[test]
    fn test_create_room_json_shape() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"create_room","name":"Alice"}"#).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::CreateRoom { name: Some("Alice".into()) }
        );
    }

    #[test]
    fn test_create_room_name_is_optional() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"create_room"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::CreateRoom { name: None });
    }

    #[test]
    fn test_join_room_json_shape() {
        let cmd: ClientCommand = serde_json::from_str(
            r#"{"type":"join_room","room_code":"k7m3xq","name":"Bob"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::JoinRoom {
                room_code: "k7m3xq".into(),
                name: Some("Bob".into()),
            }
        );
    }

    #[test]
    fn test_make_move_json_shape() {
        let cmd: ClientCommand = serde_json::from_str(
            r#"{"type":"make_move","room_code":"K7M3XQ","index":4}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::MakeMove { room_code: "K7M3XQ".into(), index: 4 }
        );
    }

    #[test]
    fn test_make_move_rejects_negative_index() {
        // A negative index doesn't fit usize — the frame fails to decode
        // and is dropped, same silent-ignore as an out-of-range move.
        let result: Result<ClientCommand, _> = serde_json::from_str(
            r#"{"type":"make_move","room_code":"K7M3XQ","index":-1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_request_rematch_json_shape() {
        let cmd: ClientCommand = serde_json::from_str(
            r#"{"type":"request_rematch","room_code":"K7M3XQ"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::RequestRematch { room_code: "K7M3XQ".into() }
        );
    }

    #[test]
    fn test_unknown_command_tag_is_a_decode_error() {
        let result: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"type":"fly_to_moon"}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_room_joined_json_shape() {
        let event = ServerEvent::RoomJoined {
            room_code: "K7M3XQ".parse().unwrap(),
            mark: Mark::X,
            state: snapshot(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "room_joined");
        assert_eq!(json["room_code"], "K7M3XQ");
        assert_eq!(json["mark"], "X");
        assert_eq!(json["state"]["players"]["x"]["name"], "Alice");
        assert!(json["state"]["players"]["o"].is_null());
    }

    #[test]
    fn test_state_update_flattens_snapshot() {
        let event = ServerEvent::StateUpdate { state: snapshot() };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        // The snapshot fields sit next to the tag, not under "state".
        assert_eq!(json["type"], "state_update");
        assert_eq!(json["room_code"], "K7M3XQ");
        assert_eq!(json["turn"], "X");
        assert!(json["winner"].is_null());
        assert_eq!(json["board"].as_array().unwrap().len(), 9);
        assert_eq!(json["rematch_votes"], 0);
        assert!(json.get("state").is_none());
    }

    #[test]
    fn test_round_reset_has_distinct_tag() {
        let event = ServerEvent::RoundReset { state: snapshot() };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "round_reset");
        assert_eq!(json["room_code"], "K7M3XQ");
    }

    #[test]
    fn test_error_message_json_shape() {
        let event = ServerEvent::ErrorMessage { message: "Not your turn.".into() };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error_message");
        assert_eq!(json["message"], "Not your turn.");
    }

    #[test]
    fn test_server_event_round_trips() {
        let mut state = snapshot();
        state.board[4] = Some(Mark::X);
        state.winner = Some(Outcome::Draw);
        for event in [
            ServerEvent::StateUpdate { state: state.clone() },
            ServerEvent::RoundReset { state },
            ServerEvent::PlayerLeft { message: "gone".into() },
        ] {
            let bytes = serde_json::to_vec(&event).unwrap();
            let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(event, decoded);
        }
    }

    #[test]
    fn test_snapshot_board_cells_serialize_as_marks_or_null() {
        let mut state = snapshot();
        state.board[0] = Some(Mark::X);
        state.board[1] = Some(Mark::O);
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["board"][0], "X");
        assert_eq!(json["board"][1], "O");
        assert!(json["board"][2].is_null());
    }
}
