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

use serde::{Deserialize, Serialize};
use std::ops::Not;
use strum_macros::Display;
use strum_macros::EnumIter;

use Color::{Black, White};
use Piece::{Bishop, King, Knight, Pawn, Queen, Rook};

/// A piece of a specific color standing on the board. The `moved` flag
/// is meaningful for pawns, rooks and kings (double advances and castling
/// rights) and is set the first time the piece is relocated by a normal
/// move, never cleared.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Material {
    color: Color,
    piece: Piece,
    moved: bool,
}

impl Material {
    pub const WK: Self = Self::new(White, King);
    pub const WQ: Self = Self::new(White, Queen);
    pub const WR: Self = Self::new(White, Rook);
    pub const WB: Self = Self::new(White, Bishop);
    pub const WN: Self = Self::new(White, Knight);
    pub const WP: Self = Self::new(White, Pawn);

    pub const BK: Self = Self::new(Black, King);
    pub const BQ: Self = Self::new(Black, Queen);
    pub const BR: Self = Self::new(Black, Rook);
    pub const BB: Self = Self::new(Black, Bishop);
    pub const BN: Self = Self::new(Black, Knight);
    pub const BP: Self = Self::new(Black, Pawn);

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self {
            color,
            piece,
            moved: false,
        }
    }

    #[inline]
    pub const fn white(piece: Piece) -> Self {
        Self::new(White, piece)
    }

    #[inline]
    pub const fn black(piece: Piece) -> Self {
        Self::new(Black, piece)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    #[inline]
    pub fn mark_moved(&mut self) {
        self.moved = true;
    }

    #[inline]
    pub const fn with_moved(mut self) -> Self {
        self.moved = true;
        self
    }

    #[inline]
    pub fn is(&self, color: Color, piece: Piece) -> bool {
        self.color == color && self.piece == piece
    }

    /// The piece's symbol in positional notation: uppercase for White,
    /// lowercase for Black.
    pub fn notation(&self) -> char {
        let c = match self.piece {
            King => 'K',
            Queen => 'Q',
            Rook => 'R',
            Bishop => 'B',
            Knight => 'N',
            Pawn => 'P',
        };
        match self.color {
            White => c,
            Black => c.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub fn to_index(&self) -> usize {
        *self as usize
    }
    pub fn is_king(&self) -> bool {
        matches!(*self, King)
    }
    pub fn is_pawn(&self) -> bool {
        matches!(*self, Pawn)
    }
    pub fn is_minor(&self) -> bool {
        matches!(*self, Knight | Bishop)
    }
    /// Whether a pawn may be promoted to this kind.
    pub fn is_promotion(&self) -> bool {
        matches!(*self, Knight | Bishop | Rook | Queen)
    }
    /// Whether relocating this piece is recorded on its `moved` flag.
    pub fn tracks_moves(&self) -> bool {
        matches!(*self, Pawn | Rook | King)
    }
}
