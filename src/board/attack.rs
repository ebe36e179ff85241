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

use super::material::{Color, Piece};
use super::movement::movement;
use super::position::Squares;
use super::square::Square;

/// Whether the side about to move stands in check, and where its king is.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    InCheck { king: Square },
    NotInCheck,
}

impl CheckStatus {
    pub fn evaluate(squares: &Squares, color: Color) -> Self {
        match attacked_king(squares, color) {
            Some(king) => Self::InCheck { king },
            None => Self::NotInCheck,
        }
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        matches!(*self, Self::InCheck { .. })
    }

    #[inline]
    pub fn king(&self) -> Option<Square> {
        match *self {
            Self::InCheck { king } => Some(king),
            Self::NotInCheck => None,
        }
    }
}

/// Scan the whole board for an enemy piece attacking `color`'s king and
/// report the king's square if one does. Walks each enemy piece's vectors,
/// stepping once or sliding until blocked; pawn forward vectors do not
/// attack.
pub fn attacked_king(squares: &Squares, color: Color) -> Option<Square> {
    for (from, material) in squares.occupied() {
        if material.color() == color {
            continue;
        }
        let movement = movement(material.color(), material.piece());
        for vector in movement.vectors {
            if material.piece().is_pawn() && vector.y == 0 {
                continue;
            }
            let mut next = from + vector;
            while let Some(square) = next {
                match squares[square] {
                    Some(target) => {
                        if target.is(color, Piece::King) {
                            return Some(square);
                        }
                        break;
                    }
                    None => {
                        if !movement.sliding {
                            break;
                        }
                        next = square + vector;
                    }
                }
            }
        }
    }
    None
}
