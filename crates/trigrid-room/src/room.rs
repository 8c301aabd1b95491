//! One room's session state machine.
//!
//! A [`Room`] owns everything two players share: the board, whose turn
//! it is, the winner of the current round, the two seats, accumulated
//! scores, and the rematch vote set. All transitions are synchronous
//! methods — the dispatch layer above guarantees they never interleave
//! for the same room, so there is no locking here.

use std::collections::HashSet;

use trigrid_protocol::{
    ConnectionId, Mark, Outcome, RoomCode, RoomSnapshot, ScoresView, SeatView,
    SeatsView,
};

use crate::RoomError;
use crate::game::{self, Board};

/// Display names are truncated to this many characters server-side.
const NAME_LIMIT: usize = 20;

/// A connection occupying a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub conn: ConnectionId,
    pub name: String,
}

/// The two seats of a room. Each seat is independently optional and is
/// pattern-matched at every access point — there is no "empty player"
/// sentinel.
#[derive(Debug, Clone, Default)]
pub struct Seats {
    x: Option<Player>,
    o: Option<Player>,
}

impl Seats {
    /// Returns the occupant of the given seat, if any.
    pub fn get(&self, mark: Mark) -> Option<&Player> {
        match mark {
            Mark::X => self.x.as_ref(),
            Mark::O => self.o.as_ref(),
        }
    }

    fn slot(&mut self, mark: Mark) -> &mut Option<Player> {
        match mark {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }

    /// Which seat a connection occupies, if it occupies one.
    pub fn mark_of(&self, conn: ConnectionId) -> Option<Mark> {
        match (&self.x, &self.o) {
            (Some(p), _) if p.conn == conn => Some(Mark::X),
            (_, Some(p)) if p.conn == conn => Some(Mark::O),
            _ => None,
        }
    }

    /// `true` when neither seat is occupied.
    pub fn both_empty(&self) -> bool {
        self.x.is_none() && self.o.is_none()
    }
}

/// Per-seat win counters. Monotone for the life of the room.
#[derive(Debug, Clone, Copy, Default)]
struct Scores {
    x: u32,
    o: u32,
}

impl Scores {
    fn bump(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }
}

/// Where a room is in its round lifecycle. Derived from seat occupancy
/// and the winner field rather than stored separately, so it can never
/// disagree with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// One seat filled; the board is idle until an opponent joins.
    WaitingForOpponent,
    /// Both seats filled, no winner yet.
    InProgress,
    /// Winner (or draw) set; only rematch votes can move the room on.
    RoundOver,
}

/// The result of a move request that didn't produce an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was applied; broadcast the new state.
    Applied,
    /// Malformed or late input — out-of-range index, a finished round,
    /// or a connection with no seat. No state change, no reply.
    Ignored,
}

/// The result of a rematch vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchOutcome {
    /// Both seated players voted; the board was reset.
    Reset,
    /// Vote recorded, consensus not reached; acknowledge the requester.
    Waiting,
    /// The round isn't over — nothing to vote on.
    Ignored,
}

/// One session between two seats.
#[derive(Debug, Clone)]
pub struct Room {
    board: Board,
    turn: Mark,
    winner: Option<Outcome>,
    seats: Seats,
    scores: Scores,
    /// Identities that asked for a new round since the current round
    /// ended. Cleared on every accepted move and every reset; pruned
    /// when a voter's seat is cleared.
    rematch_votes: HashSet<ConnectionId>,
}

impl Room {
    /// Creates a room with the creator seated at `X` and an empty board.
    pub fn create(conn: ConnectionId, name: Option<&str>) -> Self {
        let mut seats = Seats::default();
        seats.x = Some(Player {
            conn,
            name: display_name(name, "Player 1"),
        });
        Self {
            board: [None; 9],
            turn: Mark::X,
            winner: None,
            seats,
            scores: Scores::default(),
            rematch_votes: HashSet::new(),
        }
    }

    /// Seats a joiner at `O`.
    ///
    /// # Errors
    /// Returns [`RoomError::SeatOccupied`] if the `O` seat is taken.
    pub fn join(&mut self, conn: ConnectionId, name: Option<&str>) -> Result<(), RoomError> {
        let seat = self.seats.slot(Mark::O);
        if seat.is_some() {
            return Err(RoomError::SeatOccupied);
        }
        *seat = Some(Player {
            conn,
            name: display_name(name, "Player 2"),
        });
        Ok(())
    }

    /// Applies a move from `conn` at `index`.
    ///
    /// Silent-ignore inputs (out-of-range index, a round that already
    /// has a winner, a connection with no seat here) return
    /// `Ok(Ignored)`: no state change, and the caller must not reply.
    /// Rule violations return an error for the caller to unicast.
    ///
    /// An accepted move places the mark, clears the rematch votes, and
    /// re-evaluates the board: a win bumps the winner's score, a draw
    /// bumps nothing, and an undecided board flips the turn.
    pub fn apply_move(
        &mut self,
        conn: ConnectionId,
        index: usize,
    ) -> Result<MoveOutcome, RoomError> {
        if index >= self.board.len() {
            return Ok(MoveOutcome::Ignored);
        }
        if self.winner.is_some() {
            return Ok(MoveOutcome::Ignored);
        }
        let Some(mark) = self.seats.mark_of(conn) else {
            return Ok(MoveOutcome::Ignored);
        };
        if mark != self.turn {
            return Err(RoomError::NotYourTurn);
        }
        if self.board[index].is_some() {
            return Err(RoomError::CellOccupied(index));
        }

        self.board[index] = Some(mark);
        self.rematch_votes.clear();
        self.winner = game::round_outcome(&self.board);
        match self.winner {
            Some(outcome) => {
                if let Some(winner) = outcome.winning_mark() {
                    self.scores.bump(winner);
                }
            }
            None => self.turn = self.turn.other(),
        }
        Ok(MoveOutcome::Applied)
    }

    /// Records a rematch vote from `conn`. Re-voting is idempotent.
    ///
    /// Consensus requires the identities of both *currently seated*
    /// players in the vote set; when reached, the board and turn reset
    /// and the votes clear. Scores and seats carry over.
    pub fn vote_rematch(&mut self, conn: ConnectionId) -> RematchOutcome {
        if self.winner.is_none() {
            return RematchOutcome::Ignored;
        }
        self.rematch_votes.insert(conn);

        let both_voted = match (&self.seats.x, &self.seats.o) {
            (Some(x), Some(o)) => {
                self.rematch_votes.contains(&x.conn)
                    && self.rematch_votes.contains(&o.conn)
            }
            _ => false,
        };
        if !both_voted {
            return RematchOutcome::Waiting;
        }

        self.board = [None; 9];
        self.turn = Mark::X;
        self.winner = None;
        self.rematch_votes.clear();
        RematchOutcome::Reset
    }

    /// Vacates whichever seat `conn` holds, leaving the other seat and
    /// both scores untouched. Returns the cleared seat, or `None` if
    /// `conn` held no seat here.
    ///
    /// The departing identity's rematch vote is pruned with it: a vote
    /// held by an identity that can never vote again would block
    /// consensus for the surviving player permanently.
    pub fn clear_seat(&mut self, conn: ConnectionId) -> Option<Mark> {
        let mark = self.seats.mark_of(conn)?;
        *self.seats.slot(mark) = None;
        self.rematch_votes.remove(&conn);
        Some(mark)
    }

    /// Connection identities currently seated, in `X`, `O` order.
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        [self.seats.get(Mark::X), self.seats.get(Mark::O)]
            .into_iter()
            .flatten()
            .map(|p| p.conn)
    }

    /// `true` when both seats are empty — the room should be destroyed.
    pub fn is_deserted(&self) -> bool {
        self.seats.both_empty()
    }

    /// The room's current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.winner.is_some() {
            Phase::RoundOver
        } else if self.seats.x.is_some() && self.seats.o.is_some() {
            Phase::InProgress
        } else {
            Phase::WaitingForOpponent
        }
    }

    /// Full state view for broadcast.
    pub fn snapshot(&self, code: &RoomCode) -> RoomSnapshot {
        let seat_view = |mark| {
            self.seats
                .get(mark)
                .map(|p: &Player| SeatView { name: p.name.clone() })
        };
        RoomSnapshot {
            room_code: code.clone(),
            board: self.board,
            turn: self.turn,
            winner: self.winner,
            players: SeatsView {
                x: seat_view(Mark::X),
                o: seat_view(Mark::O),
            },
            scores: ScoresView {
                x: self.scores.x,
                o: self.scores.o,
            },
            rematch_votes: self.rematch_votes.len(),
        }
    }

    // -- Accessors used by dispatch and tests --------------------------------

    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn score(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.scores.x,
            Mark::O => self.scores.o,
        }
    }

    pub fn rematch_vote_count(&self) -> usize {
        self.rematch_votes.len()
    }
}

/// Trims, truncates to [`NAME_LIMIT`] characters, and falls back to the
/// seat's positional default for empty or whitespace-only input.
fn display_name(raw: Option<&str>, fallback: &str) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.chars().take(NAME_LIMIT).collect()
    }
}
