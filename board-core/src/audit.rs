//! Audit overlay.
//!
//! Landing on the audit space puts the player into a recoverable mode: the
//! fast destination disappears from every candidate list and the slow
//! destination is allowed even if a fork commitment would exclude it. Leaving
//! the resolution space for anywhere else ends the audit and restores the fork
//! commitment held when the audit began.

use crate::board::Board;
use crate::choice;
use crate::config::AuditRules;
use crate::effects::Effect;
use crate::player::{AuditStatus, Player};
use crate::space::{normalize_name, Node};

/// Audit rules, when the player is currently audited.
pub fn active_rules<'b>(board: &'b Board, player: &Player) -> Option<&'b AuditRules> {
    if player.in_audit() {
        board.rules().audit.as_ref()
    } else {
        None
    }
}

/// Final admission check for a candidate destination: single-choice
/// filtering, overridden by the audit overlay while it is active.
pub fn permits(board: &Board, player: &Player, candidate: &str) -> bool {
    if let Some(rules) = active_rules(board, player) {
        if rules.is_fast(candidate) {
            return false;
        }
        if rules.is_slow(candidate) {
            return true;
        }
    }
    !choice::conflicts(board.registry(), player, candidate)
}

/// Audit bookkeeping for a move from `from` to `to`.
pub fn on_departure(board: &Board, player: &mut Player, from: &Node, to: &Node) -> Vec<Effect> {
    let Some(rules) = board.rules().audit.as_ref() else {
        return Vec::new();
    };
    let mut effects = Vec::new();

    if player.in_audit()
        && rules.is_resolution_space(&from.normalized)
        && !rules.is_audit_space(&to.normalized)
        && !rules.is_resolution_space(&to.normalized)
    {
        let prior_choice = player
            .audit
            .as_ref()
            .and_then(|audit| audit.prior_choice.clone());

        let fork = normalize_name(&rules.fork_space);
        match &prior_choice {
            Some(choice) => {
                player.choices.insert(fork, choice.clone());
            }
            None => {
                player.choices.remove(&fork);
            }
        }

        if let Some(audit) = player.audit.as_mut() {
            audit.active = false;
        }
        tracing::debug!(player = %player.id, "audit resolved");
        effects.push(Effect::AuditResolved {
            restored_choice: prior_choice,
        });
    }

    if rules.is_audit_space(&to.normalized) && !player.in_audit() {
        let prior_choice = player.choice_for(&rules.fork_space).map(str::to_string);
        player.audit = Some(AuditStatus {
            active: true,
            prior_choice: prior_choice.clone(),
            entered_turn: player.turn,
        });
        tracing::debug!(player = %player.id, "audit started");
        effects.push(Effect::AuditStarted { prior_choice });
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementRules;
    use crate::space::{Category, NodeRecord, VisitType};

    fn board() -> Board {
        let space = |name: &str, category: Category, edges: &[&str]| {
            NodeRecord::new(name, VisitType::First, category).with_edges(edges.iter().copied())
        };
        Board::new(
            [
                space("START", Category::Main, &["TYPE-SELECT"]),
                space("TYPE-SELECT", Category::SingleChoice, &["FAST", "SLOW"]),
                space("FAST", Category::Main, &["AUDIT"]),
                space("SLOW", Category::Main, &["AUDIT"]),
                space("AUDIT", Category::Special, &["EXAM"]),
                space("EXAM", Category::Main, &["FAST", "SLOW", "AUDIT", "DONE"]),
                space("DONE", Category::Main, &[]),
            ],
            Vec::new(),
            MovementRules::new("START").with_audit(AuditRules::new(
                "AUDIT",
                "EXAM",
                "TYPE-SELECT",
                "FAST",
                "SLOW",
            )),
        )
        .unwrap()
    }

    fn node<'b>(board: &'b Board, name: &str) -> &'b Node {
        board.registry().first_visit(name).unwrap()
    }

    #[test]
    fn test_permits_without_audit_follows_choices() {
        let board = board();
        let mut player = board.new_player("Ada");
        choice::record_choice(&mut player, "TYPE-SELECT", "FAST");

        assert!(permits(&board, &player, "FAST"));
        assert!(!permits(&board, &player, "SLOW"));
    }

    #[test]
    fn test_audit_overrides_choices() {
        let board = board();
        let mut player = board.new_player("Ada");
        choice::record_choice(&mut player, "TYPE-SELECT", "FAST");

        let effects = on_departure(&board, &mut player, node(&board, "FAST"), node(&board, "AUDIT"));
        assert_eq!(
            effects,
            vec![Effect::AuditStarted {
                prior_choice: Some("FAST".to_string())
            }]
        );
        assert!(player.in_audit());
        assert!(!permits(&board, &player, "FAST"));
        assert!(permits(&board, &player, "SLOW"));
    }

    #[test]
    fn test_staying_in_audit_loop_keeps_it_active() {
        let board = board();
        let mut player = board.new_player("Ada");
        on_departure(&board, &mut player, node(&board, "SLOW"), node(&board, "AUDIT"));

        on_departure(&board, &mut player, node(&board, "EXAM"), node(&board, "AUDIT"));
        assert!(player.in_audit());
        on_departure(&board, &mut player, node(&board, "EXAM"), node(&board, "EXAM"));
        assert!(player.in_audit());
    }

    #[test]
    fn test_resolution_restores_prior_choice() {
        let board = board();
        let mut player = board.new_player("Ada");
        on_departure(&board, &mut player, node(&board, "SLOW"), node(&board, "AUDIT"));

        // A commitment made while audited is dropped on resolution.
        choice::record_choice(&mut player, "TYPE-SELECT", "SLOW");
        let effects = on_departure(&board, &mut player, node(&board, "EXAM"), node(&board, "DONE"));

        assert_eq!(
            effects,
            vec![Effect::AuditResolved {
                restored_choice: None
            }]
        );
        assert!(!player.in_audit());
        assert_eq!(player.choice_for("TYPE-SELECT"), None);
        assert!(permits(&board, &player, "FAST"));
    }
}
