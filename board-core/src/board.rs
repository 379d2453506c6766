//! The board: node registry, dice table, and movement rules, assembled once
//! and read-only afterwards.

use crate::config::MovementRules;
use crate::dice::{DiceRow, DiceTable};
use crate::error::BoardError;
use crate::movement::MovementEngine;
use crate::player::Player;
use crate::registry::NodeRegistry;
use crate::space::{NodeId, NodeRecord, VisitType};

/// Everything the movement rules read. Built in a fixed order (registry,
/// dice table, rules validation) and shared by reference afterwards.
#[derive(Debug, Clone)]
pub struct Board {
    registry: NodeRegistry,
    dice: DiceTable,
    rules: MovementRules,
}

impl Board {
    pub fn new(
        nodes: impl IntoIterator<Item = NodeRecord>,
        dice_rows: impl IntoIterator<Item = DiceRow>,
        rules: MovementRules,
    ) -> Result<Self, BoardError> {
        let registry = NodeRegistry::register(nodes)?;
        if registry.is_empty() {
            return Err(BoardError::EmptyRegistry);
        }

        let dice = DiceTable::new(dice_rows)?;
        for space in dice.spaces() {
            if !registry.contains(space) {
                tracing::warn!(space, "dice outcomes recorded for a space that is not on the board");
            }
        }

        if let Some(missing) = rules
            .configured_spaces()
            .into_iter()
            .find(|space| !registry.contains(space))
        {
            return Err(BoardError::UnknownConfiguredSpace(missing.to_string()));
        }

        Ok(Self {
            registry,
            dice,
            rules,
        })
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn dice(&self) -> &DiceTable {
        &self.dice
    }

    pub fn rules(&self) -> &MovementRules {
        &self.rules
    }

    /// A fresh player on the start space.
    pub fn new_player(&self, name: impl Into<String>) -> Player {
        let mut player = Player::new(
            name,
            NodeId::new(&self.rules.start_space, VisitType::First),
        );
        player.resources.money = self.rules.starting_money;
        player
    }

    pub fn engine(&self) -> MovementEngine<'_> {
        MovementEngine::new(self)
    }
}
