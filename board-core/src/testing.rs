//! Testing utilities for movement scenarios.
//!
//! This module provides tools for integration testing:
//! - `BoardBuilder` for small hand-written boards
//! - `TestHarness` for scripted turns against one player
//! - Assertion helpers for verifying movement state

use crate::board::Board;
use crate::config::MovementRules;
use crate::dice::{DiceResolution, DiceRow};
use crate::error::{BoardError, MovementError};
use crate::logic::{Answer, LogicStep};
use crate::movement::{MoveOptions, MoveOutcome, MoveResult};
use crate::player::Player;
use crate::space::{Category, NodeRecord, VisitType};

/// Builds a board from terse space definitions.
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    nodes: Vec<NodeRecord>,
    dice: Vec<DiceRow>,
    rules: MovementRules,
}

impl BoardBuilder {
    pub fn new(start_space: &str) -> Self {
        Self {
            nodes: Vec::new(),
            dice: Vec::new(),
            rules: MovementRules::new(start_space),
        }
    }

    /// Add a fully specified record.
    pub fn node(mut self, record: NodeRecord) -> Self {
        self.nodes.push(record);
        self
    }

    /// Add a first-visit space with the given edge slots.
    pub fn space(self, name: &str, category: Category, edges: &[&str]) -> Self {
        self.node(NodeRecord::new(name, VisitType::First, category).with_edges(edges.iter().copied()))
    }

    /// Add a movement dice row.
    pub fn dice(mut self, space: &str, visit_type: VisitType, outcomes: [&str; 6]) -> Self {
        self.dice
            .push(DiceRow::new(space, visit_type, "Next Step", outcomes));
        self
    }

    pub fn dice_row(mut self, row: DiceRow) -> Self {
        self.dice.push(row);
        self
    }

    /// Adjust the movement rules.
    pub fn rules(mut self, configure: impl FnOnce(MovementRules) -> MovementRules) -> Self {
        self.rules = configure(self.rules);
        self
    }

    pub fn build(self) -> Result<Board, BoardError> {
        Board::new(self.nodes, self.dice, self.rules)
    }
}

/// Test harness driving one player around a board.
pub struct TestHarness {
    pub board: Board,
    pub player: Player,
}

impl TestHarness {
    /// Create a harness with a fresh player on the start space.
    pub fn new(board: Board) -> Self {
        let player = board.new_player("Test Player");
        Self { board, player }
    }

    pub fn available(&mut self) -> Result<MoveResult, MovementError> {
        self.board.engine().available_moves(&mut self.player)
    }

    /// Current move options. Panics when dice or an answer are needed.
    #[track_caller]
    pub fn moves(&mut self) -> MoveOptions {
        match self.available() {
            Ok(MoveResult::Moves(options)) => options,
            other => panic!("Expected move options, got {other:?}"),
        }
    }

    pub fn move_names(&mut self) -> Vec<String> {
        self.moves().moves.into_iter().map(|m| m.name).collect()
    }

    #[track_caller]
    pub fn move_to(&mut self, destination: &str) -> MoveOutcome {
        match self.board.engine().execute_move(&mut self.player, destination) {
            Ok(outcome) => outcome,
            Err(err) => panic!("Move to {destination} failed: {err}"),
        }
    }

    #[track_caller]
    pub fn roll(&mut self, value: u8) -> DiceResolution {
        match self.board.engine().submit_dice_result(&mut self.player, value) {
            Ok(resolution) => resolution,
            Err(err) => panic!("Die value {value} rejected: {err}"),
        }
    }

    #[track_caller]
    pub fn answer(&mut self, answer: Answer) -> LogicStep {
        match self.board.engine().submit_logic_answer(&mut self.player, answer) {
            Ok(step) => step,
            Err(err) => panic!("Answer {answer:?} rejected: {err}"),
        }
    }

    /// Walk a path of destinations, one move per entry.
    #[track_caller]
    pub fn walk(&mut self, path: &[&str]) -> &mut Self {
        for destination in path {
            self.move_to(destination);
        }
        self
    }

    pub fn position_name(&self) -> &str {
        self.player.space_name()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the player stands on the named space.
#[track_caller]
pub fn assert_at(harness: &TestHarness, name: &str) {
    assert_eq!(
        harness.position_name(),
        name,
        "Expected player at '{name}', found '{}'",
        harness.position_name()
    );
}

/// Assert the available moves are exactly `expected`, in order.
#[track_caller]
pub fn assert_moves(harness: &mut TestHarness, expected: &[&str]) {
    let actual = harness.move_names();
    assert_eq!(actual, expected, "Unexpected move options");
}

/// Assert the named destination is among the available moves.
#[track_caller]
pub fn assert_can_move(harness: &mut TestHarness, name: &str) {
    let actual = harness.move_names();
    assert!(
        actual.iter().any(|m| m == name),
        "Expected '{name}' among moves {actual:?}"
    );
}

/// Assert the named destination is NOT among the available moves.
#[track_caller]
pub fn assert_cannot_move(harness: &mut TestHarness, name: &str) {
    let actual = harness.move_names();
    assert!(
        !actual.iter().any(|m| m == name),
        "Expected '{name}' to be excluded from moves {actual:?}"
    );
}

/// Assert the player's audit overlay is active.
#[track_caller]
pub fn assert_in_audit(harness: &TestHarness) {
    assert!(harness.player.in_audit(), "Expected an active audit");
}

/// Assert the player's audit overlay is NOT active.
#[track_caller]
pub fn assert_not_in_audit(harness: &TestHarness) {
    assert!(!harness.player.in_audit(), "Expected no active audit");
}
