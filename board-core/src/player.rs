//! Player state.
//!
//! Everything the movement rules remember about one player between turns.
//! The whole struct round-trips through serde.

use crate::movement::MoveCandidate;
use crate::space::{normalize_name, CardType, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time and money counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Days spent so far.
    pub time: u32,
    pub money: i64,
}

impl Resources {
    pub fn add_time(&mut self, days: i64) {
        let updated = (self.time as i64 + days).max(0);
        self.time = u32::try_from(updated).unwrap_or(u32::MAX);
    }

    pub fn add_money(&mut self, amount: i64) {
        self.money = self.money.saturating_add(amount);
    }
}

/// Card counts by deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHand {
    counts: BTreeMap<CardType, u32>,
}

impl CardHand {
    pub fn count(&self, card_type: CardType) -> u32 {
        self.counts.get(&card_type).copied().unwrap_or(0)
    }

    pub fn add(&mut self, card_type: CardType, count: u32) {
        let held = self.counts.entry(card_type).or_insert(0);
        *held = held.saturating_add(count);
    }

    /// Remove up to `count` cards, returning how many were actually removed.
    pub fn remove(&mut self, card_type: CardType, count: u32) -> u32 {
        let held = self.count(card_type);
        let removed = held.min(count);
        self.counts.insert(card_type, held - removed);
        removed
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// How far a player has walked through one logic space's question tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicProgress {
    pub question_index: usize,
    /// Nested question reached through an earlier answer.
    pub pending_question: Option<String>,
}

/// Audit overlay state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatus {
    pub active: bool,
    /// Commitment at the audited fork when the audit started.
    pub prior_choice: Option<String>,
    /// Turn number the audit started on.
    pub entered_turn: u32,
}

/// State that lives for one turn only; reset by every executed move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub die_value: Option<u8>,
    /// Destinations produced by a completed logic walk.
    pub logic_moves: Option<Vec<MoveCandidate>>,
}

/// A player moving around the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: NodeId,
    pub previous_position: Option<NodeId>,
    /// Normalized names of visited spaces.
    pub visited: HashSet<String>,
    /// Fork name to committed destination name, both normalized.
    pub choices: HashMap<String, String>,
    pub logic_progress: HashMap<String, LogicProgress>,
    /// Main-path space occupied just before the last checkpoint detour.
    pub origin_space: Option<String>,
    pub used_bypass: bool,
    pub audit: Option<AuditStatus>,
    pub resources: Resources,
    pub cards: CardHand,
    /// Completed turns.
    pub turn: u32,
    #[serde(default)]
    pub turn_state: TurnState,
}

impl Player {
    pub fn new(name: impl Into<String>, start: NodeId) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            position: start,
            previous_position: None,
            visited: HashSet::new(),
            choices: HashMap::new(),
            logic_progress: HashMap::new(),
            origin_space: None,
            used_bypass: false,
            audit: None,
            resources: Resources::default(),
            cards: CardHand::default(),
            turn: 0,
            turn_state: TurnState::default(),
        }
    }

    /// Normalized name of the current space.
    pub fn space_name(&self) -> &str {
        self.position.name()
    }

    pub fn choice_for(&self, fork: &str) -> Option<&str> {
        self.choices.get(&normalize_name(fork)).map(String::as_str)
    }

    pub fn in_audit(&self) -> bool {
        self.audit.as_ref().is_some_and(|audit| audit.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MoveSource;
    use crate::space::VisitType;

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new("Ada", NodeId::new("START", VisitType::First));
        assert_eq!(player.space_name(), "START");
        assert!(player.visited.is_empty());
        assert!(!player.in_audit());
        assert_eq!(player.turn_state, TurnState::default());
    }

    #[test]
    fn test_card_hand_remove_saturates() {
        let mut hand = CardHand::default();
        hand.add(CardType::W, 2);
        assert_eq!(hand.remove(CardType::W, 5), 2);
        assert_eq!(hand.count(CardType::W), 0);
        assert_eq!(hand.remove(CardType::E, 1), 0);
    }

    #[test]
    fn test_card_hand_add_saturates() {
        let mut hand = CardHand::default();
        hand.add(CardType::L, u32::MAX - 1);
        hand.add(CardType::L, 5);
        assert_eq!(hand.count(CardType::L), u32::MAX);
    }

    #[test]
    fn test_time_never_negative() {
        let mut resources = Resources::default();
        resources.add_time(3);
        resources.add_time(-10);
        assert_eq!(resources.time, 0);
    }

    #[test]
    fn test_player_round_trip() {
        let mut player = Player::new("Ada", NodeId::new("START", VisitType::First));
        player.visited.insert("START".to_string());
        player
            .choices
            .insert("FORK".to_string(), "LEFT".to_string());
        player.audit = Some(AuditStatus {
            active: true,
            prior_choice: Some("LEFT".to_string()),
            entered_turn: 4,
        });
        player.cards.add(CardType::B, 2);
        player.resources.add_money(-1_500);
        player.previous_position = Some(NodeId::new("CHECK", VisitType::First));
        player.origin_space = Some("ORIGIN".to_string());
        player.used_bypass = true;
        player.logic_progress.insert(
            "SCOPE-CHECK".to_string(),
            LogicProgress {
                question_index: 1,
                pending_question: Some("Is the budget approved? YES - FUNDED NO - edge 3".to_string()),
            },
        );
        player.turn_state = TurnState {
            die_value: Some(4),
            logic_moves: Some(vec![MoveCandidate {
                node: NodeId::new("FUNDED", VisitType::First),
                name: "FUNDED".to_string(),
                source: MoveSource::Logic,
                description: Some("Budget approved".to_string()),
            }]),
        };

        let json = serde_json::to_string(&player).unwrap();
        let restored: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, player);
    }
}
