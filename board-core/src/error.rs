//! Error types for board construction and movement.

use crate::space::NodeId;
use thiserror::Error;

/// Errors raised while answering or committing movement requests.
///
/// `Configuration`, `MalformedQuestion` and `UnresolvedDestination` also
/// appear as non-fatal diagnostics on [`crate::movement::MoveOptions`] when a
/// documented fallback kept the player from getting stuck.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("Configuration error at {node}: {reason}")]
    Configuration { node: String, reason: String },

    #[error("Unresolved destination: {0}")]
    UnresolvedDestination(String),

    #[error("Malformed question at {node}: {text}")]
    MalformedQuestion { node: String, text: String },

    #[error("Invalid die value {0}, expected 1-6")]
    InvalidDieValue(u8),

    #[error("A die value was already recorded this turn at {0}")]
    DiceAlreadyRolled(String),

    #[error("A die roll is required first at {0}")]
    DiceRequired(String),

    #[error("Player position {0} is not on the board")]
    UnknownPosition(NodeId),

    #[error("No question is pending at {0}")]
    NoPendingQuestion(String),

    #[error("Negotiation is not available at {0}")]
    NegotiationUnavailable(String),
}

/// Errors raised while assembling a [`crate::board::Board`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Duplicate space variant: {0}")]
    DuplicateNode(NodeId),

    #[error("Configured space {0} does not exist on the board")]
    UnknownConfiguredSpace(String),

    #[error("Dice row for {space} has {found} outcomes, expected 6")]
    MalformedDiceRow { space: String, found: usize },

    #[error("Board has no spaces")]
    EmptyRegistry,
}
