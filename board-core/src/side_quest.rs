//! Side-quest return overlay.
//!
//! A checkpoint remembers the main-path space the player came from. When the
//! player comes back to the checkpoint from a side quest, that origin's
//! first-visit moves are offered again next to the checkpoint's own, until a
//! bypass destination is taken.

use crate::board::Board;
use crate::effects::Effect;
use crate::error::MovementError;
use crate::movement::{CandidateSet, MoveSource};
use crate::player::Player;
use crate::space::{normalize_name, Node};

pub fn is_checkpoint(board: &Board, name: &str) -> bool {
    board.rules().is_checkpoint(name)
}

/// True when the player's previous position was a side-quest space.
pub fn arrived_from_side_quest(board: &Board, player: &Player) -> bool {
    player
        .previous_position
        .as_ref()
        .and_then(|previous| board.registry().get(previous))
        .is_some_and(|node| node.category.is_side_quest())
}

/// Whether the origin's moves should be merged into `node`'s options.
pub fn merges_origin(board: &Board, player: &Player, node: &Node) -> bool {
    is_checkpoint(board, &node.normalized)
        && !player.used_bypass
        && player.origin_space.is_some()
        && arrived_from_side_quest(board, player)
}

/// Normalized first-visit destinations of the stored origin.
pub fn return_options(board: &Board, player: &Player) -> Vec<String> {
    player
        .origin_space
        .as_deref()
        .and_then(|origin| board.registry().first_visit(origin))
        .map(|node| node.destinations().map(normalize_name).collect())
        .unwrap_or_default()
}

/// Offer the origin's first-visit moves, tagged as return options.
pub(crate) fn offer_origin_moves(board: &Board, player: &Player, set: &mut CandidateSet) {
    if player.used_bypass {
        return;
    }
    let Some(origin) = player.origin_space.as_deref() else {
        return;
    };
    let Some(origin_node) = board.registry().first_visit(origin) else {
        set.report(MovementError::UnresolvedDestination(origin.to_string()));
        return;
    };

    for edge in &origin_node.edges {
        if let Some(name) = edge.destination() {
            // The player is already standing there.
            if normalize_name(name) == player.space_name() {
                continue;
            }
            set.offer(board, player, name, edge.description(), MoveSource::OriginalSpace);
        }
    }
}

/// Checkpoint bookkeeping for a move from `from` to `to`.
pub fn on_departure(board: &Board, player: &mut Player, from: &Node, to: &Node) -> Vec<Effect> {
    let mut effects = Vec::new();

    if is_checkpoint(board, &from.normalized) {
        if board.rules().is_bypass(&to.normalized) {
            player.used_bypass = true;
            player.origin_space = None;
            effects.push(Effect::BypassUsed {
                checkpoint: from.normalized.clone(),
            });
        } else if let Some(origin) = player.origin_space.clone() {
            let own = from
                .destinations()
                .any(|name| normalize_name(name) == to.normalized);
            if !own && return_options(board, player).contains(&to.normalized) {
                player.origin_space = None;
                effects.push(Effect::ReturnedToOrigin { origin });
            }
        }
    }

    // Always the most recent main-path space before the checkpoint.
    if is_checkpoint(board, &to.normalized)
        && !from.category.is_side_quest()
        && !is_checkpoint(board, &from.normalized)
    {
        player.origin_space = Some(from.normalized.clone());
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementRules;
    use crate::movement::MoveResult;
    use crate::space::{Category, NodeId, NodeRecord, VisitType};

    fn board() -> Board {
        let space = |name: &str, category: Category, edges: &[&str]| {
            NodeRecord::new(name, VisitType::First, category).with_edges(edges.iter().copied())
        };
        Board::new(
            [
                space("ORIGIN", Category::Main, &["CHECK", "ORIGIN-ALT"]),
                space("ORIGIN-ALT", Category::Main, &[]),
                space("CHECK", Category::Special, &["QUEST", "BYPASS", "AHEAD"]),
                space("QUEST", Category::SideQuest, &["CHECK"]),
                space("BYPASS", Category::Main, &[]),
                space("AHEAD", Category::Main, &[]),
            ],
            Vec::new(),
            MovementRules::new("ORIGIN")
                .with_checkpoint("CHECK")
                .with_bypass_destination("BYPASS"),
        )
        .unwrap()
    }

    fn node<'b>(board: &'b Board, name: &str) -> &'b Node {
        board.registry().first_visit(name).unwrap()
    }

    #[test]
    fn test_entry_from_main_path_stores_origin() {
        let board = board();
        let mut player = board.new_player("Ada");
        on_departure(&board, &mut player, node(&board, "ORIGIN"), node(&board, "CHECK"));
        assert_eq!(player.origin_space.as_deref(), Some("ORIGIN"));
    }

    #[test]
    fn test_entry_from_side_quest_keeps_origin() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());
        on_departure(&board, &mut player, node(&board, "QUEST"), node(&board, "CHECK"));
        assert_eq!(player.origin_space.as_deref(), Some("ORIGIN"));
    }

    #[test]
    fn test_merge_requires_side_quest_arrival() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());
        player.position = NodeId::new("CHECK", VisitType::First);

        player.previous_position = Some(NodeId::new("ORIGIN", VisitType::First));
        assert!(!merges_origin(&board, &player, node(&board, "CHECK")));

        player.previous_position = Some(NodeId::new("QUEST", VisitType::First));
        assert!(merges_origin(&board, &player, node(&board, "CHECK")));

        player.used_bypass = true;
        assert!(!merges_origin(&board, &player, node(&board, "CHECK")));
    }

    #[test]
    fn test_bypass_is_permanent() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());

        let effects = on_departure(&board, &mut player, node(&board, "CHECK"), node(&board, "BYPASS"));
        assert_eq!(
            effects,
            vec![Effect::BypassUsed {
                checkpoint: "CHECK".to_string()
            }]
        );
        assert!(player.used_bypass);
        assert_eq!(player.origin_space, None);
    }

    #[test]
    fn test_return_option_clears_origin_only() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());

        let effects = on_departure(&board, &mut player, node(&board, "CHECK"), node(&board, "ORIGIN-ALT"));
        assert_eq!(
            effects,
            vec![Effect::ReturnedToOrigin {
                origin: "ORIGIN".to_string()
            }]
        );
        assert_eq!(player.origin_space, None);
        assert!(!player.used_bypass);
    }

    #[test]
    fn test_own_destination_keeps_origin() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());

        let effects = on_departure(&board, &mut player, node(&board, "CHECK"), node(&board, "QUEST"));
        assert!(effects.is_empty());
        assert_eq!(player.origin_space.as_deref(), Some("ORIGIN"));
    }

    #[test]
    fn test_origin_moves_skip_current_space() {
        let board = board();
        let mut player = board.new_player("Ada");
        player.origin_space = Some("ORIGIN".to_string());
        player.position = NodeId::new("CHECK", VisitType::First);
        player.previous_position = Some(NodeId::new("QUEST", VisitType::First));

        let Ok(MoveResult::Moves(options)) = board.engine().available_moves(&mut player) else {
            panic!("Expected move options");
        };
        let names: Vec<_> = options.moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["QUEST", "BYPASS", "AHEAD", "ORIGIN-ALT"]);
        assert_eq!(options.moves[3].source, MoveSource::OriginalSpace);
    }
}
