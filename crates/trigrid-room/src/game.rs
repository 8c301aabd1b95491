//! Board geometry and win detection.

use trigrid_protocol::{Mark, Outcome};

/// Row-major 3×3 board. Index 0 is the top-left cell, 8 the bottom-right.
pub type Board = [Option<Mark>; 9];

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Evaluates a board: a mark filling any line wins; a full board with no
/// winning line is a draw; anything else is still undecided.
///
/// This is a pure function of the board — the `winner` field of a room
/// is only ever set from its result. It runs once per accepted move,
/// over all 8 lines, rather than tracking lines incrementally.
pub fn round_outcome(board: &Board) -> Option<Outcome> {
    for line in WIN_LINES {
        if let [Some(a), Some(b), Some(c)] = line.map(|i| board[i]) {
            if a == b && b == c {
                return Some(a.into());
            }
        }
    }
    if board.iter().all(Option::is_some) {
        return Some(Outcome::Draw);
    }
    None
}
