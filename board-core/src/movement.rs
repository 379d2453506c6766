//! Movement orchestration.
//!
//! [`MovementEngine`] answers "where can this player go now?" by consulting
//! the dice, logic, single-choice, side-quest and audit rules in a fixed
//! order, and commits a chosen move with all of its bookkeeping.

use crate::audit;
use crate::board::Board;
use crate::choice;
use crate::dice::{self, DiceResolution};
use crate::effects::{self, Effect};
use crate::error::MovementError;
use crate::history;
use crate::logic::{self, Answer, LogicPrompt, LogicStep};
use crate::player::{Player, TurnState};
use crate::side_quest;
use crate::space::{normalize_name, Category, EdgeDescriptor, Node, NodeId, VisitType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Candidates
// ============================================================================

/// Where a candidate move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    /// An edge of the current space.
    Standard,
    /// A first-visit edge of the stored origin space.
    OriginalSpace,
    Dice,
    Logic,
    /// The committed destination of a fork being revisited.
    RepeatedChoice,
    /// Substituted because nothing else resolved.
    EmergencyFallback,
}

/// One destination the player may move to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCandidate {
    pub node: NodeId,
    /// Normalized space name.
    pub name: String,
    pub source: MoveSource,
    pub description: Option<String>,
}

impl MoveCandidate {
    pub fn is_repeated_choice(&self) -> bool {
        self.source == MoveSource::RepeatedChoice
    }
}

/// Ordered, de-duplicated candidates plus the diagnostics collected while
/// building them.
#[derive(Debug, Default)]
pub(crate) struct CandidateSet {
    moves: Vec<MoveCandidate>,
    seen: HashSet<NodeId>,
    diagnostics: Vec<MovementError>,
}

impl CandidateSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` for this player and add it unless the single-choice or
    /// audit rules exclude it. Unresolvable names become diagnostics.
    pub(crate) fn offer(
        &mut self,
        board: &Board,
        player: &Player,
        name: &str,
        description: Option<&str>,
        source: MoveSource,
    ) -> bool {
        let visit_type = history::visit_type(player, name);
        let Some(node) = board.registry().lookup(name, visit_type) else {
            self.report(MovementError::UnresolvedDestination(name.trim().to_string()));
            return false;
        };
        if !audit::permits(board, player, &node.normalized) {
            return false;
        }

        self.push(MoveCandidate {
            node: node.id.clone(),
            name: node.normalized.clone(),
            source,
            description: description.map(str::to_string),
        })
    }

    /// Add a candidate without filtering. The first candidate for a node wins.
    pub(crate) fn push(&mut self, candidate: MoveCandidate) -> bool {
        if !self.seen.insert(candidate.node.clone()) {
            return false;
        }
        self.moves.push(candidate);
        true
    }

    pub(crate) fn report(&mut self, diagnostic: MovementError) {
        tracing::warn!(%diagnostic, "movement diagnostic");
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<MoveCandidate>, Vec<MovementError>) {
        (self.moves, self.diagnostics)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Candidate moves for the player's current space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOptions {
    pub node: NodeId,
    pub visit_type: VisitType,
    pub moves: Vec<MoveCandidate>,
    /// Non-fatal problems found while building `moves`.
    pub diagnostics: Vec<MovementError>,
}

impl MoveOptions {
    pub fn names(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&MoveCandidate> {
        let name = normalize_name(name);
        self.moves.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Answer to [`MovementEngine::available_moves`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// The space's outcomes depend on a die roll not yet submitted.
    NeedsDice { node: NodeId, visit_type: VisitType },
    /// A logic question must be answered first.
    NeedsAnswer(LogicPrompt),
    Moves(MoveOptions),
}

/// A committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: NodeId,
    pub to: NodeId,
    pub effects: Vec<Effect>,
}

/// A turn spent negotiating in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiateOutcome {
    pub space: NodeId,
    pub effects: Vec<Effect>,
}

// ============================================================================
// Engine
// ============================================================================

/// Movement rules bound to one board.
#[derive(Debug, Clone, Copy)]
pub struct MovementEngine<'a> {
    board: &'a Board,
}

impl<'a> MovementEngine<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &'a Board {
        self.board
    }

    /// The node the player is standing on.
    pub fn current_node(&self, player: &Player) -> Result<&'a Node, MovementError> {
        self.board
            .registry()
            .get(&player.position)
            .ok_or_else(|| MovementError::UnknownPosition(player.position.clone()))
    }

    /// Candidate moves for the player's current space.
    ///
    /// Takes the player mutably because a fork revisited without a recorded
    /// commitment adopts an already-visited option, and that is persisted.
    pub fn available_moves(&self, player: &mut Player) -> Result<MoveResult, MovementError> {
        let board = self.board;
        let node = self.current_node(player)?;

        if dice::requires_dice(board.dice(), player) {
            return Ok(MoveResult::NeedsDice {
                node: node.id.clone(),
                visit_type: node.visit_type,
            });
        }

        let mut set = CandidateSet::new();

        if let Some(value) = player.turn_state.die_value {
            let resolution = dice::resolve(board, player, value)?;
            if !resolution.moves.is_empty() {
                return Ok(MoveResult::Moves(MoveOptions {
                    node: node.id.clone(),
                    visit_type: node.visit_type,
                    moves: resolution.moves,
                    diagnostics: resolution.diagnostics,
                }));
            }
            set.diagnostics.extend(resolution.diagnostics);
        }

        if node.has_questions() {
            if let Some(moves) = player.turn_state.logic_moves.clone() {
                for candidate in moves {
                    set.push(candidate);
                }
                return Ok(MoveResult::Moves(self.finish(node, player, set)));
            }
            match logic::current_prompt(node, player) {
                Ok(Some(prompt)) => return Ok(MoveResult::NeedsAnswer(prompt)),
                Ok(None) => {}
                Err(err) => set.report(err),
            }
        }

        if node.category == Category::SingleChoice && !self.is_open_audit_fork(node, player) {
            let mut committed =
                choice::committed_choice(player, &node.normalized).map(str::to_string);
            // Inference is only for revisits.
            if committed.is_none()
                && history::arrival_visit_type(player) == VisitType::Subsequent
            {
                committed = choice::infer_choice(board.registry(), player, &node.normalized);
            }
            if let Some(choice) = committed {
                let description = node
                    .edges
                    .iter()
                    .find(|edge| edge.destination().is_some_and(|d| normalize_name(d) == choice))
                    .and_then(EdgeDescriptor::description);
                if set.offer(board, player, &choice, description, MoveSource::RepeatedChoice) {
                    return Ok(MoveResult::Moves(self.finish(node, player, set)));
                }
            }
        }

        for edge in &node.edges {
            match edge {
                EdgeDescriptor::OriginReference => {
                    side_quest::offer_origin_moves(board, player, &mut set);
                }
                EdgeDescriptor::Plain(_) | EdgeDescriptor::WithDescription { .. } => {
                    if let Some(name) = edge.destination() {
                        set.offer(board, player, name, edge.description(), MoveSource::Standard);
                    }
                }
                EdgeDescriptor::Question(_) | EdgeDescriptor::Negotiate | EdgeDescriptor::Empty => {}
            }
        }

        if side_quest::merges_origin(board, player, node) {
            side_quest::offer_origin_moves(board, player, &mut set);
        }

        Ok(MoveResult::Moves(self.finish(node, player, set)))
    }

    /// Record the die value for this turn and apply its card and resource
    /// effects. Only one value may be submitted per turn.
    pub fn submit_dice_result(
        &self,
        player: &mut Player,
        value: u8,
    ) -> Result<DiceResolution, MovementError> {
        let node = self.current_node(player)?;
        if player.turn_state.die_value.is_some() {
            return Err(MovementError::DiceAlreadyRolled(node.normalized.clone()));
        }

        let resolution = dice::resolve(self.board, player, value)?;
        player.turn_state.die_value = Some(value);
        effects::apply_effects(player, &resolution.effects);

        tracing::debug!(
            player = %player.id,
            space = %node.id,
            value,
            moves = resolution.moves.len(),
            "die result recorded"
        );
        Ok(resolution)
    }

    /// Answer the pending logic question at the player's space.
    pub fn submit_logic_answer(
        &self,
        player: &mut Player,
        answer: Answer,
    ) -> Result<LogicStep, MovementError> {
        let node = self.current_node(player)?;
        if dice::requires_dice(self.board.dice(), player) {
            return Err(MovementError::DiceRequired(node.normalized.clone()));
        }
        if !node.has_questions() || player.turn_state.logic_moves.is_some() {
            return Err(MovementError::NoPendingQuestion(node.normalized.clone()));
        }
        logic::answer(self.board, player, node, answer)
    }

    /// Move the player to `destination`: a node id, an exact space name, or
    /// a normalized space name.
    ///
    /// The destination is validated before anything changes, so a rejected
    /// move leaves the player untouched. The turn state is always reset last.
    pub fn execute_move(
        &self,
        player: &mut Player,
        destination: &str,
    ) -> Result<MoveOutcome, MovementError> {
        let board = self.board;
        let from = self.current_node(player)?;
        let to = board
            .registry()
            .lookup(destination, history::visit_type(player, destination))
            .ok_or_else(|| MovementError::UnresolvedDestination(destination.to_string()))?;

        let mut effects = Vec::new();

        if from.category == Category::SingleChoice
            && choice::fork_options(board.registry(), &from.normalized).contains(&to.normalized)
            && choice::record_choice(player, &from.normalized, &to.normalized)
        {
            effects.push(Effect::ChoiceCommitted {
                fork: from.normalized.clone(),
                destination: to.normalized.clone(),
            });
        }

        effects.extend(side_quest::on_departure(board, player, from, to));
        effects.extend(audit::on_departure(board, player, from, to));

        history::record_visit(player, &from.normalized);
        player.previous_position = Some(std::mem::replace(&mut player.position, to.id.clone()));
        history::record_visit(player, &to.normalized);

        let arrival = effects::arrival_effects(to);
        effects::apply_effects(player, &arrival);
        effects.extend(arrival);

        logic::clear_progress(player, &from.normalized);
        player.turn += 1;

        tracing::debug!(
            player = %player.id,
            from = %from.id,
            to = %to.id,
            turn = player.turn,
            "move executed"
        );

        player.turn_state = TurnState::default();
        Ok(MoveOutcome {
            from: from.id.clone(),
            to: to.id.clone(),
            effects,
        })
    }

    pub fn can_negotiate(&self, player: &Player) -> bool {
        self.current_node(player)
            .is_ok_and(|node| node.allows_negotiation())
    }

    /// Stay on the current space, take the time penalty, and end the turn.
    pub fn negotiate(&self, player: &mut Player) -> Result<NegotiateOutcome, MovementError> {
        let node = self.current_node(player)?;
        if !node.allows_negotiation() {
            return Err(MovementError::NegotiationUnavailable(node.normalized.clone()));
        }

        let effects = vec![
            Effect::TimeChanged {
                days: i64::from(self.board.rules().negotiate_penalty_days),
                reason: format!("{} negotiation", node.normalized),
            },
            Effect::Negotiated {
                space: node.normalized.clone(),
            },
        ];
        effects::apply_effects(player, &effects);

        logic::clear_progress(player, &node.normalized);
        player.turn += 1;
        tracing::debug!(player = %player.id, space = %node.id, "negotiated");

        player.turn_state = TurnState::default();
        Ok(NegotiateOutcome {
            space: node.id.clone(),
            effects,
        })
    }

    /// Whether the player is standing on the audited fork mid-audit, where
    /// the fork's options are open again.
    fn is_open_audit_fork(&self, node: &Node, player: &Player) -> bool {
        audit::active_rules(self.board, player)
            .is_some_and(|rules| normalize_name(&rules.fork_space) == node.normalized)
    }

    /// Turn the collected candidates into options, substituting the emergency
    /// fallback when nothing survived on a non-finish space.
    fn finish(&self, node: &Node, player: &Player, mut set: CandidateSet) -> MoveOptions {
        let rules = self.board.rules();

        if set.is_empty() && !rules.is_finish(&node.normalized) {
            let fallback = rules.fallback();
            let reason = if node.declares_no_edges() {
                "space declares no edges"
            } else {
                "no edge resolved to an allowed destination"
            };
            set.report(MovementError::Configuration {
                node: node.normalized.clone(),
                reason: format!("{reason}, falling back to {fallback}"),
            });

            match self
                .board
                .registry()
                .lookup(fallback, history::visit_type(player, fallback))
            {
                Some(target) => {
                    set.push(MoveCandidate {
                        node: target.id.clone(),
                        name: target.normalized.clone(),
                        source: MoveSource::EmergencyFallback,
                        description: None,
                    });
                }
                None => set.report(MovementError::UnresolvedDestination(fallback.to_string())),
            }
        }

        let (moves, diagnostics) = set.into_parts();
        MoveOptions {
            node: node.id.clone(),
            visit_type: node.visit_type,
            moves,
            diagnostics,
        }
    }
}
