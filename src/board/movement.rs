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

use super::material::{Color, Piece};
use super::square::Offset;

use Color::*;
use Piece::*;

/// How a piece kind moves: its direction vectors, and whether a vector is
/// repeated until blocked (sliding) or applied once (stepping).
///
/// Pawn vectors describe shape only; occupancy rules (empty forward
/// squares, enemy material on diagonals) are enforced by the move
/// generator, and the forward vectors are excluded from attack scans.
#[derive(Debug, Clone, Copy)]
pub struct Movement {
    pub vectors: &'static [Offset],
    pub sliding: bool,
}

const KING: Movement = Movement {
    vectors: &[
        Offset::new(0, 1),
        Offset::new(0, -1),
        Offset::new(1, 0),
        Offset::new(1, -1),
        Offset::new(1, 1),
        Offset::new(-1, 0),
        Offset::new(-1, 1),
        Offset::new(-1, -1),
    ],
    sliding: false,
};

const QUEEN: Movement = Movement {
    vectors: KING.vectors,
    sliding: true,
};

const ROOK: Movement = Movement {
    vectors: &[
        Offset::new(1, 0),
        Offset::new(-1, 0),
        Offset::new(0, 1),
        Offset::new(0, -1),
    ],
    sliding: true,
};

const BISHOP: Movement = Movement {
    vectors: &[
        Offset::new(1, 1),
        Offset::new(1, -1),
        Offset::new(-1, 1),
        Offset::new(-1, -1),
    ],
    sliding: true,
};

const KNIGHT: Movement = Movement {
    vectors: &[
        Offset::new(1, 2),
        Offset::new(1, -2),
        Offset::new(-1, 2),
        Offset::new(-1, -2),
        Offset::new(2, 1),
        Offset::new(2, -1),
        Offset::new(-2, 1),
        Offset::new(-2, -1),
    ],
    sliding: false,
};

const WHITE_PAWN: Movement = Movement {
    vectors: &[
        Offset::new(1, 0),
        Offset::new(2, 0),
        Offset::new(1, 1),
        Offset::new(1, -1),
    ],
    sliding: false,
};

const BLACK_PAWN: Movement = Movement {
    vectors: &[
        Offset::new(-1, 0),
        Offset::new(-2, 0),
        Offset::new(-1, 1),
        Offset::new(-1, -1),
    ],
    sliding: false,
};

/// Look up the movement description for a piece of the given color.
#[inline]
pub const fn movement(color: Color, piece: Piece) -> &'static Movement {
    match piece {
        King => &KING,
        Queen => &QUEEN,
        Rook => &ROOK,
        Bishop => &BISHOP,
        Knight => &KNIGHT,
        Pawn => match color {
            White => &WHITE_PAWN,
            Black => &BLACK_PAWN,
        },
    }
}
