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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::attack::CheckStatus;
use super::fen::to_fen;
use super::material::{Color, Material, Piece};
use super::moves::{MoveError, MoveState, SafeSquares};
use super::position::{LastMove, Position, PositionKey};
use super::square::{Rank, Square};
use super::Turn;

use Color::*;
use MoveError::*;
use Piece::*;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardResult {
    CheckMate(Color),
    StaleMate,
    Insufficient,
    Repetition,
    FiftyMoves,
}

impl fmt::Display for BoardResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CheckMate(winner) => write!(f, "Checkmate! {winner} wins."),
            Self::StaleMate => write!(f, "Stalemate! It's a draw."),
            Self::Insufficient => write!(f, "Draw due to insufficient material."),
            Self::Repetition => write!(f, "Draw by threefold repetition."),
            Self::FiftyMoves => write!(f, "Draw by fifty-move rule."),
        }
    }
}

/// The engine's move-application state machine. Accepts moves while the
/// game is ongoing, applies administrative board edits, and re-evaluates
/// check, safe squares, repetition and termination after every mutation.
#[derive(Debug, Clone)]
pub struct PlayState {
    moves: MoveState,
    repetitions: HashMap<PositionKey, u8>,
    repetition_reached: bool,
    result: Option<BoardResult>,
}

impl Default for PlayState {
    fn default() -> Self {
        Self::new()
    }
}

impl Turn for PlayState {
    #[inline]
    fn turn(&self) -> Color {
        self.moves.turn()
    }
}

impl PlayState {
    pub fn new() -> Self {
        Self::with_position(Position::new())
    }

    fn with_position(position: Position) -> Self {
        let mut state = Self {
            moves: MoveState::new(position),
            repetitions: HashMap::new(),
            repetition_reached: false,
            result: None,
        };
        // the opening position is the first occurrence of its fingerprint
        state.record_repetition();
        state.update_result();
        state
    }

    #[inline]
    pub fn position(&self) -> &Position {
        self.moves.position()
    }
    #[inline]
    pub fn check(&self) -> CheckStatus {
        self.moves.check()
    }
    #[inline]
    pub fn safe_squares(&self) -> &SafeSquares {
        self.moves.safe_squares()
    }
    #[inline]
    pub fn last_move(&self) -> Option<&LastMove> {
        self.position().last_move()
    }
    #[inline]
    pub fn result(&self) -> Option<BoardResult> {
        self.result
    }
    #[inline]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }
    pub fn fen(&self) -> String {
        to_fen(self.position())
    }

    /// Apply a move for the side to move. Fails, leaving the board
    /// unchanged, if the game is over, the destination is not among the
    /// source piece's safe squares, or the promotion request is invalid.
    pub fn submit_move(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> Result<()> {
        if self.is_over() {
            return Err(GameOver.into());
        }
        let Some(material) = self.position().contents(from) else {
            return Err(InvalidMove.into());
        };
        if material.color() != self.turn() {
            return Err(InvalidMove.into());
        }
        if !self.moves.is_safe(from, to) {
            return Err(InvalidMove.into());
        }
        let promotion = validate_promotion(material, to, promotion)?;
        self.moves.apply(from, to, promotion);
        self.record_repetition();
        self.update_result();
        Ok(())
    }

    /// Administrative placement or removal at a square. Clears the last
    /// move and re-evaluates check, safe squares and termination.
    pub fn set_piece(&mut self, square: Square, material: Option<Material>) {
        self.moves.position_mut().set_piece(square, material);
        self.moves.refresh();
        self.update_result();
    }

    /// Administrative removal; equivalent to placing nothing.
    pub fn remove_piece(&mut self, square: Square) {
        self.set_piece(square, None);
    }

    /// Administrative relocation: no legality gate and no special-move
    /// semantics, but the turn is toggled and derived state re-evaluated.
    pub fn relocate(&mut self, from: Square, to: Square) -> Result<()> {
        if self.moves.position_mut().relocate(from, to).is_none() {
            return Err(EmptySource.into());
        }
        self.moves.refresh();
        self.update_result();
        Ok(())
    }

    fn record_repetition(&mut self) {
        let key = self.position().key();
        let count = self.repetitions.entry(key).or_insert(0);
        *count += 1;
        if *count >= 3 {
            // latched; the flag survives the position changing again
            self.repetition_reached = true;
        }
    }

    /// Classify the position, first matching condition wins.
    fn update_result(&mut self) {
        use BoardResult::*;
        self.result = if self.insufficient_material() {
            Some(Insufficient)
        } else if !self.moves.can_move() {
            if self.check().is_check() {
                Some(CheckMate(!self.turn()))
            } else {
                Some(StaleMate)
            }
        } else if self.repetition_reached {
            Some(Repetition)
        } else if self.position().moves_since_progress() >= 100 {
            Some(FiftyMoves)
        } else {
            None
        };
    }

    /// Draw detection by remaining material. King + two knights versus a
    /// lone king counts as insufficient here, as does one side reduced to
    /// same-colored bishops.
    fn insufficient_material(&self) -> bool {
        let position = self.position();
        let white: Vec<(Square, Material)> = position.pieces_of(White).collect();
        let black: Vec<(Square, Material)> = position.pieces_of(Black).collect();

        match (white.len(), black.len()) {
            (1, 1) => true,
            (1, 2) => has_lone_minor(&black),
            (2, 1) => has_lone_minor(&white),
            (2, 2) => lone_bishops_share_color(&white, &black),
            (3, 1) if only_two_knights(&white) => true,
            (1, 3) if only_two_knights(&black) => true,
            (w, 1) if w >= 3 => only_same_color_bishops(&white),
            (1, b) if b >= 3 => only_same_color_bishops(&black),
            _ => false,
        }
    }
}

fn validate_promotion(
    material: Material,
    to: Square,
    promotion: Option<Piece>,
) -> Result<Option<Piece>> {
    let promoting =
        material.piece().is_pawn() && to.rank() == Rank::promotion_rank(material.color());
    match (promoting, promotion) {
        (true, Some(piece)) if piece.is_promotion() => Ok(Some(piece)),
        (true, Some(piece)) => Err(UnsupportedPromotion(piece).into()),
        (true, None) => Err(MissingPromotion.into()),
        // a requested kind is inert unless the move is a promotion
        (false, _) => Ok(None),
    }
}

fn has_lone_minor(pieces: &[(Square, Material)]) -> bool {
    pieces.iter().any(|(_, m)| m.piece().is_minor())
}

fn only_two_knights(pieces: &[(Square, Material)]) -> bool {
    pieces.iter().filter(|(_, m)| m.piece() == Knight).count() == 2
}

fn only_same_color_bishops(pieces: &[(Square, Material)]) -> bool {
    let bishops: Vec<Square> = pieces
        .iter()
        .filter(|(_, m)| m.piece() == Bishop)
        .map(|(sq, _)| *sq)
        .collect();
    bishops.len() == pieces.len() - 1
        && (bishops.iter().all(|sq| sq.is_light()) || bishops.iter().all(|sq| !sq.is_light()))
}

fn lone_bishops_share_color(white: &[(Square, Material)], black: &[(Square, Material)]) -> bool {
    let white_bishop = white.iter().find(|(_, m)| m.piece() == Bishop);
    let black_bishop = black.iter().find(|(_, m)| m.piece() == Bishop);
    match (white_bishop, black_bishop) {
        (Some((ws, _)), Some((bs, _))) => ws.is_light() == bs.is_light(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    fn fools_mate(state: &mut PlayState) {
        state.submit_move(F2, F3, None).unwrap();
        state.submit_move(E7, E5, None).unwrap();
        state.submit_move(G2, G4, None).unwrap();
        state.submit_move(D8, H4, None).unwrap();
    }

    #[test]
    fn test_new_game_is_ongoing() {
        let state = PlayState::new();
        assert_eq!(state.result(), None);
        assert!(!state.is_over());
        assert_eq!(state.turn(), White);
        assert!(!state.check().is_check());
    }
    #[test]
    fn test_checkmate_detection() {
        let mut state = PlayState::new();
        fools_mate(&mut state);
        assert_eq!(state.result(), Some(BoardResult::CheckMate(Black)));
        assert_eq!(state.check().king(), Some(E1));
        assert_eq!(
            state.result().unwrap().to_string(),
            "Checkmate! Black wins."
        );
    }
    #[test]
    fn test_no_moves_after_game_over() {
        let mut state = PlayState::new();
        fools_mate(&mut state);
        let err = state.submit_move(A2, A3, None).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::GameOver)));
    }
    #[test]
    fn test_wrong_color_rejected() {
        let mut state = PlayState::new();
        let err = state.submit_move(E7, E5, None).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::InvalidMove)));
    }
    #[test]
    fn test_unreachable_destination_rejected() {
        let mut state = PlayState::new();
        let err = state.submit_move(E2, E5, None).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::InvalidMove)));
        // board untouched
        assert_eq!(state.position().contents(E2), Some(Material::WP));
        assert_eq!(state.turn(), White);
    }
    #[test]
    fn test_empty_source_rejected() {
        let mut state = PlayState::new();
        let err = state.submit_move(E4, E5, None).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::InvalidMove)));
    }
    #[test]
    fn test_stalemate_detection() {
        let position = Position::empty_board()
            .set_contents(H8, Some(Material::BK))
            .set_contents(F7, Some(Material::WK))
            .set_contents(G6, Some(Material::WQ))
            .set_turn(Black);
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::StaleMate));
        assert_eq!(state.result().unwrap().to_string(), "Stalemate! It's a draw.");
    }
    #[test]
    fn test_checkmate_versus_stalemate() {
        let position = Position::empty_board()
            .set_contents(H8, Some(Material::BK))
            .set_contents(F6, Some(Material::WK))
            .set_contents(G7, Some(Material::WQ))
            .set_turn(Black);
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::CheckMate(White)));
    }
    #[test]
    fn test_kings_only_is_insufficient() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::Insufficient));
        assert_eq!(
            state.result().unwrap().to_string(),
            "Draw due to insufficient material."
        );
    }
    #[test]
    fn test_king_and_minor_is_insufficient() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(C3, Some(Material::WB));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::Insufficient));
    }
    #[test]
    fn test_king_and_rook_is_sufficient() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(A1, Some(Material::WR));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), None);
    }
    #[test]
    fn test_two_knights_versus_lone_king_is_insufficient() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(B1, Some(Material::WN))
            .set_contents(G1, Some(Material::WN))
            .set_contents(E8, Some(Material::BK));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::Insufficient));
    }
    #[test]
    fn test_same_colored_lone_bishops_are_insufficient() {
        // both bishops on light squares
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(F1, Some(Material::WB))
            .set_contents(C8, Some(Material::BB));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), Some(BoardResult::Insufficient));
    }
    #[test]
    fn test_opposite_colored_lone_bishops_are_sufficient() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(F1, Some(Material::WB))
            .set_contents(F8, Some(Material::BB));
        let state = PlayState::with_position(position);
        assert_eq!(state.result(), None);
    }
    #[test]
    fn test_fifty_move_rule_triggers_at_100() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(A1, Some(Material::WR))
            .set_contents(H8, Some(Material::BR))
            .set_moves_since_progress(99);
        let mut state = PlayState::with_position(position);
        assert_eq!(state.result(), None);
        state.submit_move(A1, A2, None).unwrap();
        assert_eq!(state.result(), Some(BoardResult::FiftyMoves));
        assert_eq!(
            state.result().unwrap().to_string(),
            "Draw by fifty-move rule."
        );
    }
    #[test]
    fn test_pawn_move_resets_fifty_move_clock() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(A2, Some(Material::WP))
            .set_contents(H8, Some(Material::BR))
            .set_moves_since_progress(99);
        let mut state = PlayState::with_position(position);
        state.submit_move(A2, A3, None).unwrap();
        assert_eq!(state.position().moves_since_progress(), 0);
        assert_eq!(state.result(), None);
    }
    #[test]
    fn test_threefold_repetition_latches() {
        let mut state = PlayState::new();
        let shuffle = [
            (G1, F3),
            (G8, F6),
            (F3, G1),
            (F6, G8),
            (G1, F3),
            (G8, F6),
            (F3, G1),
            (F6, G8),
        ];
        for (i, (from, to)) in shuffle.into_iter().enumerate() {
            assert_eq!(state.result(), None, "ended early at move {i}");
            state.submit_move(from, to, None).unwrap();
        }
        // the starting position has now been on the board three times
        assert_eq!(state.result(), Some(BoardResult::Repetition));
        assert_eq!(
            state.result().unwrap().to_string(),
            "Draw by threefold repetition."
        );
    }
    #[test]
    fn test_promotion_requires_a_kind() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(B7, Some(Material::WP.with_moved()));
        let mut state = PlayState::with_position(position);
        let err = state.submit_move(B7, B8, None).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::MissingPromotion)));
        assert_eq!(state.position().contents(B7), Some(Material::WP.with_moved()));
    }
    #[test]
    fn test_promotion_rejects_unsupported_kind() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(B7, Some(Material::WP.with_moved()));
        let mut state = PlayState::with_position(position);
        let err = state.submit_move(B7, B8, Some(King)).unwrap_err();
        assert!(matches!(
            err.downcast_ref(),
            Some(MoveError::UnsupportedPromotion(King))
        ));
    }
    #[test]
    fn test_promotion_places_chosen_piece() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(B7, Some(Material::WP.with_moved()));
        let mut state = PlayState::with_position(position);
        state.submit_move(B7, B8, Some(Knight)).unwrap();
        let placed = state.position().contents(B8).unwrap();
        assert_eq!(placed.piece(), Knight);
        assert_eq!(placed.color(), White);
    }
    #[test]
    fn test_promotion_kind_inert_on_ordinary_move() {
        let mut state = PlayState::new();
        state.submit_move(E2, E4, Some(Queen)).unwrap();
        assert_eq!(state.position().contents(E4), Some(Material::WP.with_moved()));
    }
    #[test]
    fn test_castling_through_the_state_machine() {
        let mut state = PlayState::new();
        state.submit_move(G1, F3, None).unwrap();
        state.submit_move(G8, F6, None).unwrap();
        state.submit_move(G2, G3, None).unwrap();
        state.submit_move(G7, G6, None).unwrap();
        state.submit_move(F1, G2, None).unwrap();
        state.submit_move(F8, G7, None).unwrap();
        state.submit_move(E1, G1, None).unwrap();
        assert_eq!(state.position().contents(G1), Some(Material::WK.with_moved()));
        assert_eq!(state.position().contents(F1), Some(Material::WR.with_moved()));
        assert_eq!(state.position().contents(E1), None);
        assert_eq!(state.position().contents(H1), None);
        assert_eq!(state.turn(), Black);
    }
    #[test]
    fn test_set_piece_clears_last_move() {
        let mut state = PlayState::new();
        state.submit_move(E2, E4, None).unwrap();
        assert!(state.position().en_passant_target().is_some());
        state.set_piece(A3, Some(Material::WN));
        assert_eq!(state.last_move(), None);
        assert_eq!(state.position().en_passant_target(), None);
    }
    #[test]
    fn test_remove_piece_reevaluates_result() {
        let position = Position::empty_board()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
            .set_contents(D4, Some(Material::WQ));
        let mut state = PlayState::with_position(position);
        assert_eq!(state.result(), None);
        state.remove_piece(D4);
        assert_eq!(state.result(), Some(BoardResult::Insufficient));
    }
    #[test]
    fn test_relocate_requires_a_piece() {
        let mut state = PlayState::new();
        let err = state.relocate(E4, E5).unwrap_err();
        assert!(matches!(err.downcast_ref(), Some(MoveError::EmptySource)));
    }
    #[test]
    fn test_relocate_flips_turn_and_recomputes() {
        let mut state = PlayState::new();
        state.relocate(B1, C6).unwrap();
        assert_eq!(state.turn(), Black);
        assert_eq!(state.last_move(), None);
        assert_eq!(state.position().contents(C6), Some(Material::WN));
        // black's safe squares were recomputed for the new position
        assert!(state.safe_squares().contains_key(&B7));
    }
    #[test]
    fn test_both_kings_survive_normal_play(){
        let mut state = PlayState::new();
        for (from, to) in [(E2, E4), (E7, E5), (G1, F3), (B8, C6), (F1, B5), (G8, F6)] {
            state.submit_move(from, to, None).unwrap();
            let kings: Vec<_> = state
                .position()
                .squares()
                .occupied()
                .filter(|(_, m)| m.piece().is_king())
                .collect();
            assert_eq!(kings.len(), 2);
        }
    }
}
