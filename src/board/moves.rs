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

use std::collections::HashMap;
use thiserror::Error;

use super::attack::{attacked_king, CheckStatus};
use super::material::{Color, Material, Piece};
use super::movement::movement;
use super::position::{Position, Squares};
use super::square::{File, Offset, Rank, Square};
use super::Turn;

use Color::*;
use File::{FileA, FileB, FileC, FileD, FileE, FileF, FileG, FileH};
use Piece::*;

#[derive(Error, Debug)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("not a legal move")]
    InvalidMove,
    #[error("no piece on the source square")]
    EmptySource,
    #[error("{0} is not a legal promotion")]
    UnsupportedPromotion(Piece),
    #[error("a promotion piece must be chosen")]
    MissingPromotion,
}

/// For each piece of the side to move with at least one legal move, the
/// ordered list of destination squares that neither violate movement
/// rules nor leave the mover's own king attacked. An empty map means the
/// side to move has no legal moves.
pub type SafeSquares = HashMap<Square, Vec<Square>>;

/// A position together with its derived state: the check status of the
/// side to move and the full table of its safe squares. Both are
/// recomputed after every mutation.
#[derive(Debug, Clone)]
pub struct MoveState {
    position: Position,
    check: CheckStatus,
    safe_squares: SafeSquares,
}

impl Default for MoveState {
    fn default() -> Self {
        Self::new(Position::new())
    }
}

impl Turn for MoveState {
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl MoveState {
    pub fn new(position: Position) -> Self {
        let mut state = Self {
            position,
            check: CheckStatus::NotInCheck,
            safe_squares: SafeSquares::new(),
        };
        state.refresh();
        state
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }
    #[inline]
    pub fn check(&self) -> CheckStatus {
        self.check
    }
    #[inline]
    pub fn safe_squares(&self) -> &SafeSquares {
        &self.safe_squares
    }
    #[inline]
    pub fn can_move(&self) -> bool {
        !self.safe_squares.is_empty()
    }

    /// Whether `to` is a legal destination for the piece on `from`.
    pub fn is_safe(&self, from: Square, to: Square) -> bool {
        self.safe_squares
            .get(&from)
            .is_some_and(|destinations| destinations.contains(&to))
    }

    /// The legal destinations for the piece on `from`, empty if it has
    /// none or does not belong to the side to move.
    pub fn destinations(&self, from: Square) -> &[Square] {
        self.safe_squares
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn apply(&mut self, from: Square, to: Square, promotion: Option<Piece>) {
        self.position.apply_move(from, to, promotion);
        self.refresh();
    }

    pub(super) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    /// Recompute check status and safe squares for the side to move.
    pub(super) fn refresh(&mut self) {
        self.check = CheckStatus::evaluate(self.position.squares(), self.position.turn());
        self.safe_squares = find_safe_squares(&self.position, self.check.is_check());
    }
}

fn find_safe_squares(position: &Position, in_check: bool) -> SafeSquares {
    let mut result = SafeSquares::new();
    let color = position.turn();
    for (from, material) in position.pieces_of(color) {
        let mut destinations = Vec::new();
        let movement = movement(color, material.piece());
        for vector in movement.vectors {
            if movement.sliding {
                slide(position, color, from, *vector, &mut destinations);
            } else {
                step(position, material, from, *vector, &mut destinations);
            }
        }
        match material.piece() {
            King => {
                if can_castle(position, in_check, true) {
                    destinations.push(Square::new(FileG, from.rank()));
                }
                if can_castle(position, in_check, false) {
                    destinations.push(Square::new(FileC, from.rank()));
                }
            }
            Pawn => {
                if let Some(to) = en_passant_capture(position, material, from) {
                    destinations.push(to);
                }
            }
            _ => {}
        }
        if !destinations.is_empty() {
            result.insert(from, destinations);
        }
    }
    result
}

/// Apply a stepping piece's vector once.
fn step(position: &Position, material: Material, from: Square, vector: Offset, out: &mut Vec<Square>) {
    let Some(to) = from + vector else {
        return;
    };
    let target = position.contents(to);
    if matches!(target, Some(t) if t.color() == material.color()) {
        return;
    }
    if material.piece().is_pawn() {
        if vector.x.abs() == 2 {
            // double advance: unmoved pawn, both squares empty
            if material.has_moved() || target.is_some() {
                return;
            }
            let between = from + Offset::new(vector.x / 2, 0);
            if between.map_or(true, |sq| position.is_occupied(sq)) {
                return;
            }
        } else if vector.y == 0 {
            // single advance: only onto an empty square
            if target.is_some() {
                return;
            }
        } else {
            // diagonal: only onto enemy material (en passant is
            // synthesized separately)
            if target.is_none() {
                return;
            }
        }
    }
    if is_move_safe(position.squares(), material.color(), from, to) {
        out.push(to);
    }
}

/// Walk a sliding piece's vector until blocked.
fn slide(position: &Position, color: Color, from: Square, vector: Offset, out: &mut Vec<Square>) {
    let mut next = from + vector;
    while let Some(to) = next {
        let target = position.contents(to);
        if matches!(target, Some(t) if t.color() == color) {
            break;
        }
        if is_move_safe(position.squares(), color, from, to) {
            out.push(to);
        }
        if target.is_some() {
            break;
        }
        next = to + vector;
    }
}

/// The single safety predicate behind every legal move: hypothetically
/// relocate the piece on a scratch copy of the grid and ask whether the
/// mover's king is attacked afterwards. The live grid is untouched on
/// every path.
fn is_move_safe(squares: &Squares, color: Color, from: Square, to: Square) -> bool {
    let mut scratch = *squares;
    scratch[to] = scratch[from].take();
    attacked_king(&scratch, color).is_none()
}

/// Castling preconditions for the side to move: king and rook unmoved on
/// their home squares, the lane between them empty, the king not in
/// check, and both the transit square and the destination passing the
/// safety predicate.
fn can_castle(position: &Position, in_check: bool, king_side: bool) -> bool {
    if in_check {
        return false;
    }
    let color = position.turn();
    let rank = Rank::back_rank(color);
    let king_src = Square::new(FileE, rank);
    if !matches!(position.contents(king_src), Some(m) if m.is(color, King) && !m.has_moved()) {
        return false;
    }
    let rook_src = Square::new(if king_side { FileH } else { FileA }, rank);
    if !matches!(position.contents(rook_src), Some(m) if m.is(color, Rook) && !m.has_moved()) {
        return false;
    }
    let transit = Square::new(if king_side { FileF } else { FileD }, rank);
    let dest = Square::new(if king_side { FileG } else { FileC }, rank);
    if position.is_occupied(transit) || position.is_occupied(dest) {
        return false;
    }
    if !king_side && position.is_occupied(Square::new(FileB, rank)) {
        return false;
    }
    is_move_safe(position.squares(), color, king_src, transit)
        && is_move_safe(position.squares(), color, king_src, dest)
}

/// En-passant destination for a pawn, available only on the move
/// immediately following an enemy double advance that landed laterally
/// adjacent. Legality is probed with the bypassed pawn off the board.
fn en_passant_capture(position: &Position, pawn: Material, from: Square) -> Option<Square> {
    let lm = position.last_move()?;
    if !lm.material.piece().is_pawn() || lm.material.color() == pawn.color() {
        return None;
    }
    if (lm.to.rank() - lm.from.rank()).abs() != 2 || lm.to.rank() != from.rank() {
        return None;
    }
    if (lm.to.file() - from.file()).abs() != 1 {
        return None;
    }
    let forward = if pawn.color() == White { 1 } else { -1 };
    let to = Square::new(lm.to.file(), (from.rank() + forward)?);
    let mut scratch = *position.squares();
    scratch[lm.to] = None;
    is_move_safe(&scratch, pawn.color(), from, to).then_some(to)
}
