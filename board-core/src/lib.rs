//! Movement rules engine for a project-management board game.
//!
//! This crate provides:
//! - A node registry with first/subsequent visit variants per space
//! - Dice, logic-question, single-choice, side-quest and audit rules
//! - A movement engine that lists legal moves and commits them
//! - Player persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use board_core::{Board, Category, MoveResult, MovementRules, NodeRecord, VisitType};
//!
//! let board = Board::new(
//!     [
//!         NodeRecord::new("OWNER-SCOPE", VisitType::First, Category::Main)
//!             .with_edges(["OWNER-FUND-INITIATION"]),
//!         NodeRecord::new("OWNER-FUND-INITIATION", VisitType::First, Category::Main),
//!     ],
//!     Vec::new(),
//!     MovementRules::new("OWNER-SCOPE"),
//! )?;
//!
//! let engine = board.engine();
//! let mut player = board.new_player("Ada");
//! if let MoveResult::Moves(options) = engine.available_moves(&mut player)? {
//!     engine.execute_move(&mut player, &options.moves[0].name)?;
//! }
//! ```

pub mod audit;
pub mod board;
pub mod choice;
pub mod config;
pub mod dice;
pub mod effects;
pub mod error;
pub mod history;
pub mod logic;
pub mod movement;
pub mod persist;
pub mod player;
pub mod registry;
pub mod side_quest;
pub mod space;
pub mod testing;

// Primary public API
pub use board::Board;
pub use config::{AuditRules, MovementRules};
pub use dice::{DiceResolution, DiceRow};
pub use effects::Effect;
pub use error::{BoardError, MovementError};
pub use logic::{Answer, LogicPrompt, LogicStep};
pub use movement::{
    MoveCandidate, MoveOptions, MoveOutcome, MoveResult, MoveSource, MovementEngine,
    NegotiateOutcome,
};
pub use persist::{PersistError, SavedGame};
pub use player::{Player, PlayerId};
pub use registry::NodeRegistry;
pub use space::{Category, EdgeDescriptor, Node, NodeId, NodeRecord, VisitType};
pub use testing::{BoardBuilder, TestHarness};
