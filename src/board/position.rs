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

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;

use super::material::{Color, Material, Piece};
use super::square::{File, Offset, Rank, Square};
use super::Turn;

use Color::*;
use File::{FileA, FileE, FileH};
use Piece::*;

/// The 8-by-8 grid of squares and their contents.
///
/// `Copy` so that legality probes can simulate a move on a throwaway
/// copy; the live grid is never mutated during a probe.
#[derive(Debug, Clone, Copy)]
pub struct Squares([Option<Material>; 64]);

impl Squares {
    pub(super) fn empty() -> Self {
        Self([None; 64])
    }

    /// All occupied squares with their material.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Material)> + '_ {
        Square::iter().filter_map(|square| self.0[square.to_index()].map(|m| (square, m)))
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

/// The most recently completed move. Cleared whenever the board is
/// edited outside normal move application.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub material: Material,
    pub from: Square,
    pub to: Square,
}

/// Fingerprint of a position for repetition detection: placement, side to
/// move, castling rights and en-passant target. The move counters are
/// excluded by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    placement: [u8; 64],
    turn: Color,
    castling: [bool; 4],
    en_passant: Option<Square>,
}

static INITIAL: Lazy<Squares> = Lazy::new(|| {
    const BACK_RANK: [Piece; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
    let mut squares = Squares::empty();
    for color in Color::iter() {
        let back = Rank::back_rank(color);
        let pawns = Rank::pawn_rank(color);
        for file in File::iter() {
            squares[Square::new(file, back)] = Some(Material::new(color, BACK_RANK[file.to_index()]));
            squares[Square::new(file, pawns)] = Some(Material::new(color, Pawn));
        }
    }
    squares
});

/// The raw state of the game: square contents, side to move, last move
/// and the two move counters. Derived state (check status, safe squares,
/// repetition history, termination) lives upstream.
#[derive(Debug, Clone)]
pub struct Position {
    squares: Squares,
    turn: Color,
    last_move: Option<LastMove>,
    moves_since_progress: u16,
    move_number: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position, White to move.
    pub fn new() -> Self {
        Self {
            squares: *INITIAL,
            turn: White,
            last_move: None,
            moves_since_progress: 0,
            move_number: 1,
        }
    }

    #[inline]
    pub fn squares(&self) -> &Squares {
        &self.squares
    }
    #[inline]
    pub fn contents(&self, square: Square) -> Option<Material> {
        self.squares[square]
    }
    #[inline]
    pub fn is_vacant(&self, square: Square) -> bool {
        self.squares[square].is_none()
    }
    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.squares[square].is_some()
    }
    #[inline]
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }
    /// Halfmove clock: moves since the last pawn advance or capture.
    #[inline]
    pub fn moves_since_progress(&self) -> usize {
        self.moves_since_progress as usize
    }
    /// Fullmove number, starting at 1 and incremented after Black moves.
    #[inline]
    pub fn move_number(&self) -> usize {
        self.move_number as usize
    }

    /// All material belonging to `color`, with its square.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Material)> + '_ {
        self.squares.occupied().filter(move |(_, m)| m.color() == color)
    }

    /// The square a pawn could capture onto en passant, derived from the
    /// last move having been a double pawn advance.
    pub fn en_passant_target(&self) -> Option<Square> {
        let lm = self.last_move.as_ref()?;
        if !lm.material.piece().is_pawn() {
            return None;
        }
        let delta = lm.to.rank() - lm.from.rank();
        if delta.abs() != 2 {
            return None;
        }
        lm.from + Offset::new(delta / 2, 0)
    }

    /// Castling rights per side, `[white kingside, white queenside,
    /// black kingside, black queenside]`, derived live from the king and
    /// rook `moved` flags rather than cached.
    pub fn castling_rights(&self) -> [bool; 4] {
        let mut rights = [false; 4];
        for color in [White, Black] {
            let rank = Rank::back_rank(color);
            let king = self.squares[Square::new(FileE, rank)];
            if !matches!(king, Some(m) if m.is(color, King) && !m.has_moved()) {
                continue;
            }
            let base = color.to_index() * 2;
            rights[base] = self.unmoved_rook(color, Square::new(FileH, rank));
            rights[base + 1] = self.unmoved_rook(color, Square::new(FileA, rank));
        }
        rights
    }

    fn unmoved_rook(&self, color: Color, square: Square) -> bool {
        matches!(self.squares[square], Some(m) if m.is(color, Rook) && !m.has_moved())
    }

    pub fn key(&self) -> PositionKey {
        let mut placement = [0u8; 64];
        for (square, material) in self.squares.occupied() {
            placement[square.to_index()] = material.notation() as u8;
        }
        PositionKey {
            placement,
            turn: self.turn,
            castling: self.castling_rights(),
            en_passant: self.en_passant_target(),
        }
    }

    /// Apply a validated move: mark the mover, maintain the halfmove
    /// clock, perform castling/en-passant/promotion effects, relocate the
    /// piece, record the move and toggle the turn.
    ///
    /// Callers must have validated the move; `from` holds material of the
    /// side to move and `to` is one of its safe squares.
    pub(super) fn apply_move(&mut self, from: Square, to: Square, promotion: Option<Piece>) {
        let mut material = self.remove(from).expect("validated move from an empty square");
        if material.piece().tracks_moves() {
            material.mark_moved();
        }
        let capture = self.is_occupied(to);
        if material.piece().is_pawn() || capture {
            self.moves_since_progress = 0;
        } else {
            self.moves_since_progress += 1;
        }
        self.apply_special_effects(material, from, to);
        let placed = match promotion {
            Some(piece) => Material::new(material.color(), piece).with_moved(),
            None => material,
        };
        self.place(to, placed);
        self.last_move = Some(LastMove {
            material: placed,
            from,
            to,
        });
        self.turn = !self.turn;
        if self.turn == White {
            self.move_number += 1;
        }
    }

    fn apply_special_effects(&mut self, material: Material, from: Square, to: Square) {
        if material.piece().is_king() && (to.file() - from.file()).abs() == 2 {
            // Castling: bring the rook to the far side of the king.
            let rank = from.rank();
            let (rook_from, rook_to) = if to.file() > from.file() {
                (Square::new(FileH, rank), Square::new(File::FileF, rank))
            } else {
                (Square::new(FileA, rank), Square::new(File::FileD, rank))
            };
            if let Some(mut rook) = self.remove(rook_from) {
                rook.mark_moved();
                self.place(rook_to, rook);
            }
        } else if material.piece().is_pawn() && from.file() != to.file() && self.is_vacant(to) {
            // En passant: the bypassed pawn sits on the departure rank at
            // the destination file.
            self.remove(Square::new(to.file(), from.rank()));
        }
    }

    /// Administrative relocation: no legality gate, no special-move
    /// semantics, no `moved` bookkeeping. Maintains the halfmove clock,
    /// clears the last move and toggles the turn. Returns the relocated
    /// material, or `None` if the source square was empty.
    pub(super) fn relocate(&mut self, from: Square, to: Square) -> Option<Material> {
        let material = self.remove(from)?;
        let capture = self.remove(to).is_some();
        if material.piece().is_pawn() || capture {
            self.moves_since_progress = 0;
        } else {
            self.moves_since_progress += 1;
        }
        self.place(to, material);
        self.last_move = None;
        self.turn = !self.turn;
        Some(material)
    }

    /// Administrative placement or removal. Clears the last move: an
    /// edited board has no en-passant eligibility.
    pub(super) fn set_piece(&mut self, square: Square, material: Option<Material>) {
        self.squares[square] = material;
        self.last_move = None;
    }

    pub(super) fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        self.squares[square].replace(material)
    }

    pub(super) fn remove(&mut self, square: Square) -> Option<Material> {
        self.squares[square].take()
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

#[cfg(test)]
impl Position {
    pub fn empty_board() -> Self {
        Self {
            squares: Squares::empty(),
            turn: White,
            last_move: None,
            moves_since_progress: 0,
            move_number: 1,
        }
    }
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        self.squares[square] = value;
        self
    }
    pub fn set_turn(mut self, turn: Color) -> Self {
        self.turn = turn;
        self
    }
    pub fn set_moves_since_progress(mut self, value: u16) -> Self {
        self.moves_since_progress = value;
        self
    }
}
