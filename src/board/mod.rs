// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Rules engine for a two-player game of chess on an 8-by-8 board
//!
//! A _board_ represents the state of a chess game and provides the core
//! mechanisms to play it: it decides which destination squares are legal
//! for each piece of the side to move, applies chosen moves, and
//! classifies the resulting position. The following features are
//! supported:
//!
//! [x] Standard chess rules
//! [x] Castling, en passant and pawn promotion
//! [x] Check, checkmate and stalemate detection
//! [x] Draw by insufficient material (two knights vs a lone king also
//!     counts as a draw here)
//! [x] Draw by threefold repetition
//! [x] Draw by the fifty-move rule
//! [x] FEN serialization of the current position
//! [x] Administrative board edits for setup/analysis UIs
//! [ ] Move search or evaluation of any kind
//! [ ] Chess variants
//!
//! Some of the key abstractions include:
//!
//! * A `Square` names one of the 64 squares via a `File` (`FileA` ..
//!   `FileH`) and a `Rank` (`Rank1` .. `Rank8`). An `Offset` is a
//!   movement vector between squares; stepping off the board yields
//!   `None` rather than an error.
//!
//! * `Material` is a piece of a specific color standing on the board,
//!   together with the flag recording whether it has ever been moved by
//!   a normal move (pawn double advances and castling rights depend on
//!   it). `Piece` has the six usual variants.
//!
//! * A `Position` holds the raw game state: the contents of each square,
//!   whose turn it is, the last move played and the two move counters.
//!
//! * `MoveState` wraps a position together with the derived state that
//!   must be recomputed after every mutation: whether the side to move
//!   is in check, and the full `SafeSquares` table of legal
//!   destinations. A destination is only ever offered if applying it
//!   leaves the mover's own king out of check, verified on a scratch
//!   copy of the grid.
//!
//! * `PlayState` is the move-application state machine. It validates
//!   incoming moves against the safe-square table, applies special-move
//!   effects, tracks position repetitions and decides when the game is
//!   over (`BoardResult`). Administrative entry points bypass the
//!   legality gate for board editing but still recompute all derived
//!   state.
//!
//! * `Board` is the facade consumed by a UI layer: one mutable game
//!   instance, mutated synchronously, with read-only views that must be
//!   re-read after every mutation.

use anyhow::Result;

mod attack;
mod fen;
mod material;
mod movement;
mod moves;
mod play;
mod position;
mod square;

pub use attack::*;
pub use fen::*;
pub use material::*;
pub use movement::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;

use std::ops::Index;

pub trait Turn {
    fn turn(&self) -> Color;
}

/// A playable chess board with the standard initial setup.
#[derive(Debug, Clone, Default)]
pub struct Board {
    state: PlayState,
}

impl Board {
    pub fn new() -> Self {
        Self {
            state: PlayState::new(),
        }
    }

    /// Apply a move for the side to move; see [`PlayState::submit_move`].
    pub fn submit_move(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> Result<()> {
        self.state.submit_move(from, to, promotion)
    }

    /// Place material (or clear) at a square, outside normal play.
    pub fn set_piece(&mut self, square: Square, material: Option<Material>) {
        self.state.set_piece(square, material)
    }

    /// Remove whatever stands at a square, outside normal play.
    pub fn remove_piece(&mut self, square: Square) {
        self.state.remove_piece(square)
    }

    /// Relocate a piece without validation, outside normal play.
    pub fn relocate(&mut self, from: Square, to: Square) -> Result<()> {
        self.state.relocate(from, to)
    }

    /// The legal destinations for the piece on `from`.
    pub fn move_destinations(&self, from: Square) -> &[Square] {
        self.state
            .safe_squares()
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[inline]
    pub fn squares(&self) -> &Squares {
        self.state.position().squares()
    }
    #[inline]
    pub fn contents(&self, square: Square) -> Option<Material> {
        self.state.position().contents(square)
    }
    #[inline]
    pub fn safe_squares(&self) -> &SafeSquares {
        self.state.safe_squares()
    }
    #[inline]
    pub fn check(&self) -> CheckStatus {
        self.state.check()
    }
    #[inline]
    pub fn last_move(&self) -> Option<&LastMove> {
        self.state.last_move()
    }
    #[inline]
    pub fn result(&self) -> Option<BoardResult> {
        self.state.result()
    }
    #[inline]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }
    pub fn fen(&self) -> String {
        self.state.fen()
    }
}

impl Turn for Board {
    #[inline]
    fn turn(&self) -> Color {
        self.state.turn()
    }
}

impl Index<Square> for Board {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.state.position()[index]
    }
}
