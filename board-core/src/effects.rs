//! Effects produced by movement.
//!
//! Resource and card effects change the player when applied; bookkeeping
//! effects (commitments, bypass, audit) are already reflected in player state
//! by the tracker that produced them and are reported for the caller's benefit.

use crate::player::Player;
use crate::space::{CardDirective, CardType, Node};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Days added (or saved, when negative)
    TimeChanged { days: i64, reason: String },

    /// Money gained (or paid, when negative)
    MoneyChanged { amount: i64, reason: String },

    CardsDrawn { card_type: CardType, count: u32 },

    CardsRemoved { card_type: CardType, count: u32 },

    /// Cards swapped one-for-one; the count held does not change
    CardsReplaced { card_type: CardType, count: u32 },

    /// A fork commitment was recorded
    ChoiceCommitted { fork: String, destination: String },

    /// The checkpoint overlay was permanently disabled
    BypassUsed { checkpoint: String },

    /// The player took a return option back toward their origin
    ReturnedToOrigin { origin: String },

    AuditStarted { prior_choice: Option<String> },

    AuditResolved { restored_choice: Option<String> },

    /// The player stayed put and skipped the turn
    Negotiated { space: String },
}

/// Effects of arriving at `node`: time, fee, and fixed card directives.
pub fn arrival_effects(node: &Node) -> Vec<Effect> {
    let mut effects = Vec::new();

    if node.time > 0 {
        effects.push(Effect::TimeChanged {
            days: node.time as i64,
            reason: node.normalized.clone(),
        });
    }
    if node.fee != 0 {
        effects.push(Effect::MoneyChanged {
            amount: -node.fee,
            reason: format!("{} fee", node.normalized),
        });
    }
    effects.extend(
        node.cards
            .iter()
            .map(|(card_type, directive)| card_effect(*card_type, *directive)),
    );

    effects
}

pub fn card_effect(card_type: CardType, directive: CardDirective) -> Effect {
    match directive {
        CardDirective::Draw(count) => Effect::CardsDrawn { card_type, count },
        CardDirective::Remove(count) => Effect::CardsRemoved { card_type, count },
        CardDirective::Replace(count) => Effect::CardsReplaced { card_type, count },
    }
}

/// Apply effects to the player.
pub fn apply_effects(player: &mut Player, effects: &[Effect]) {
    for effect in effects {
        apply_effect(player, effect);
    }
}

/// Apply a single effect to the player.
pub fn apply_effect(player: &mut Player, effect: &Effect) {
    match effect {
        Effect::TimeChanged { days, .. } => player.resources.add_time(*days),
        Effect::MoneyChanged { amount, .. } => player.resources.add_money(*amount),
        Effect::CardsDrawn { card_type, count } => player.cards.add(*card_type, *count),
        Effect::CardsRemoved { card_type, count } => {
            player.cards.remove(*card_type, *count);
        }
        Effect::CardsReplaced { .. }
        | Effect::ChoiceCommitted { .. }
        | Effect::BypassUsed { .. }
        | Effect::ReturnedToOrigin { .. }
        | Effect::AuditStarted { .. }
        | Effect::AuditResolved { .. }
        | Effect::Negotiated { .. } => {}
    }
}
