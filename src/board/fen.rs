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

use strum::IntoEnumIterator;

use super::material::Color;
use super::position::Position;
use super::square::{File, Rank, Square};
use super::Turn;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Serialize a position to FEN: eight rank fields from rank 8 down to
/// rank 1 with runs of empty squares as digits, then active color,
/// castling rights, en-passant target, halfmove clock and fullmove
/// number. Pure; serializing the same position twice yields the same
/// string.
pub fn to_fen(position: &Position) -> String {
    let mut fen = String::new();
    for rank in Rank::iter().rev() {
        let mut empty = 0;
        for file in File::iter() {
            match position.contents(Square::new(file, rank)) {
                Some(material) => {
                    if empty != 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(material.notation());
                }
                None => empty += 1,
            }
        }
        if empty != 0 {
            fen.push_str(&empty.to_string());
        }
        if rank != Rank::Rank1 {
            fen.push('/');
        }
    }
    fen.push(' ');
    fen.push(match position.turn() {
        Color::White => 'w',
        Color::Black => 'b',
    });
    fen.push(' ');
    fen.push_str(&castling_field(position));
    fen.push(' ');
    match position.en_passant_target() {
        Some(square) => fen.push_str(&square.to_string()),
        None => fen.push('-'),
    }
    fen.push_str(&format!(
        " {} {}",
        position.moves_since_progress(),
        position.move_number()
    ));
    fen
}

/// Castling-rights letters, derived live from the king and rook `moved`
/// flags rather than from any cached rights. `-` if neither side retains
/// a right.
fn castling_field(position: &Position) -> String {
    let [wk, wq, bk, bq] = position.castling_rights();
    let mut field = String::new();
    if wk {
        field.push('K');
    }
    if wq {
        field.push('Q');
    }
    if bk {
        field.push('k');
    }
    if bq {
        field.push('q');
    }
    if field.is_empty() {
        field.push('-');
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, PlayState};
    use Square::*;

    #[test]
    fn test_starting_position() {
        assert_eq!(to_fen(&Position::new()), STARTING_FEN);
    }
    #[test]
    fn test_serialization_is_pure() {
        let position = Position::new();
        assert_eq!(to_fen(&position), to_fen(&position));
    }
    #[test]
    fn test_en_passant_field_after_double_advance() {
        let mut state = PlayState::new();
        state.submit_move(E2, E4, None).unwrap();
        assert_eq!(
            state.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        state.submit_move(C7, C5, None).unwrap();
        assert_eq!(
            state.fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2"
        );
    }
    #[test]
    fn test_halfmove_clock_counts_quiet_moves() {
        let mut state = PlayState::new();
        state.submit_move(E2, E4, None).unwrap();
        state.submit_move(C7, C5, None).unwrap();
        state.submit_move(G1, F3, None).unwrap();
        assert_eq!(
            state.fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }
    #[test]
    fn test_castling_rights_drop_when_king_moves() {
        let mut state = PlayState::new();
        state.submit_move(E2, E4, None).unwrap();
        state.submit_move(E7, E5, None).unwrap();
        state.submit_move(E1, E2, None).unwrap();
        assert_eq!(
            state.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPPKPPP/RNBQ1BNR b kq - 1 2"
        );
        // rights stay gone even after the king returns home
        state.submit_move(G8, F6, None).unwrap();
        state.submit_move(E2, E1, None).unwrap();
        assert!(state.fen().contains(" b kq "));
    }
    #[test]
    fn test_bare_kings() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK));
        assert_eq!(to_fen(&position), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }
}
