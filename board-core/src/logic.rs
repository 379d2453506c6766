//! Logic question engine.
//!
//! Logic spaces carry yes/no questions instead of plain edges:
//!
//! ```text
//! Is the scope over $4M? YES -edge 2 NO -REG-DOB-TYPE-SELECT
//! ```
//!
//! A branch that itself contains `?` is the next question of the same space;
//! `edge N` points at another edge slot of the space; a terminal branch names
//! one or more destinations joined by ` or `.

use crate::board::Board;
use crate::error::MovementError;
use crate::movement::{CandidateSet, MoveCandidate, MoveSource};
use crate::player::Player;
use crate::space::{EdgeDescriptor, Node, NodeId};
use serde::{Deserialize, Serialize};

const YES_MARKER: &str = "YES -";
const NO_MARKER: &str = " NO -";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

/// One parsed question with its two branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicQuestion {
    pub question: String,
    pub yes: String,
    pub no: String,
}

impl LogicQuestion {
    /// Split on the first `?`, then take the first `YES -` and the last
    /// ` NO -` after it. `None` when either marker is missing.
    pub fn parse(text: &str) -> Option<Self> {
        let (question, rest) = text.split_once('?')?;
        let yes_start = rest.find(YES_MARKER)?;
        let no_start = rest.rfind(NO_MARKER)?;
        if no_start < yes_start {
            return None;
        }

        Some(Self {
            question: format!("{}?", question.trim()),
            yes: rest[yes_start + YES_MARKER.len()..no_start].trim().to_string(),
            no: rest[no_start + NO_MARKER.len()..].trim().to_string(),
        })
    }

    /// Like [`LogicQuestion::parse`], reporting a malformed question at `node`.
    pub fn parse_at(node: &str, text: &str) -> Result<Self, MovementError> {
        Self::parse(text).ok_or_else(|| MovementError::MalformedQuestion {
            node: node.to_string(),
            text: text.to_string(),
        })
    }

    pub fn branch(&self, answer: Answer) -> &str {
        match answer {
            Answer::Yes => &self.yes,
            Answer::No => &self.no,
        }
    }
}

/// The question a player has to answer next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicPrompt {
    pub node: NodeId,
    pub question: String,
    pub question_index: usize,
}

/// Result of answering a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicStep {
    NextQuestion(LogicPrompt),
    Destinations {
        moves: Vec<MoveCandidate>,
        /// Several options: the pick only commits when the turn is ended.
        confirm_on_end_turn: bool,
        diagnostics: Vec<MovementError>,
    },
}

/// Raw text of the question the player is on at `node`.
pub fn current_question(node: &Node, player: &Player) -> Option<String> {
    player
        .logic_progress
        .get(&node.normalized)
        .and_then(|progress| progress.pending_question.clone())
        .or_else(|| node.questions().next().map(str::to_string))
}

/// Prompt for the pending question, `Ok(None)` when the space asks nothing.
pub fn current_prompt(node: &Node, player: &Player) -> Result<Option<LogicPrompt>, MovementError> {
    let Some(text) = current_question(node, player) else {
        return Ok(None);
    };
    let question = LogicQuestion::parse_at(&node.normalized, &text)?;
    let question_index = player
        .logic_progress
        .get(&node.normalized)
        .map_or(0, |progress| progress.question_index);

    Ok(Some(LogicPrompt {
        node: node.id.clone(),
        question: question.question,
        question_index,
    }))
}

/// Resolve an `edge N` reference to the text of that slot.
pub fn dereference<'a>(node: &'a Node, segment: &'a str) -> &'a str {
    let segment = segment.trim();
    let ordinal = segment
        .split_once(char::is_whitespace)
        .filter(|(word, _)| word.eq_ignore_ascii_case("edge"))
        .and_then(|(_, number)| number.trim().parse::<usize>().ok());

    match ordinal.and_then(|ordinal| node.edge_slot(ordinal)) {
        Some(slot) => slot.trim(),
        None => segment,
    }
}

/// Answer the pending question at `node`.
///
/// Either advances to the next question or produces the final destination
/// set, which is stored on the player's turn state.
pub fn answer(
    board: &Board,
    player: &mut Player,
    node: &Node,
    answer: Answer,
) -> Result<LogicStep, MovementError> {
    let text = current_question(node, player)
        .ok_or_else(|| MovementError::NoPendingQuestion(node.normalized.clone()))?;
    let question = LogicQuestion::parse_at(&node.normalized, &text)?;
    let segment = dereference(node, question.branch(answer));

    if segment.contains('?') {
        let next = LogicQuestion::parse_at(&node.normalized, segment)?;
        let progress = player
            .logic_progress
            .entry(node.normalized.clone())
            .or_default();
        progress.question_index += 1;
        progress.pending_question = Some(segment.to_string());

        return Ok(LogicStep::NextQuestion(LogicPrompt {
            node: node.id.clone(),
            question: next.question,
            question_index: progress.question_index,
        }));
    }

    let mut set = CandidateSet::new();
    for option in segment.split(" or ") {
        let edge = EdgeDescriptor::parse(option);
        match edge.destination() {
            Some(name) => {
                set.offer(board, player, name, edge.description(), MoveSource::Logic);
            }
            None => set.report(MovementError::UnresolvedDestination(option.trim().to_string())),
        }
    }
    let (moves, diagnostics) = set.into_parts();

    player.turn_state.logic_moves = Some(moves.clone());
    Ok(LogicStep::Destinations {
        confirm_on_end_turn: moves.len() > 1,
        moves,
        diagnostics,
    })
}

/// Forget question progress at a space the player is leaving.
pub fn clear_progress(player: &mut Player, node_name: &str) {
    player.logic_progress.remove(node_name);
}
