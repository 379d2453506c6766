//! Visit history: which spaces a player has seen, and which visit variant a
//! space resolves to for them.

use crate::player::Player;
use crate::space::{normalize_name, VisitType};

/// Visit variant a space would resolve to for this player right now.
///
/// `Subsequent` when the space was visited before, or is the player's current
/// or previous position. Before the first move every space is `First`, even
/// the start space the player is standing on.
pub fn visit_type(player: &Player, name: &str) -> VisitType {
    if player.visited.is_empty() {
        return VisitType::First;
    }

    let name = normalize_name(name);
    let is_previous = player
        .previous_position
        .as_ref()
        .is_some_and(|previous| previous.name() == name);

    if player.visited.contains(&name) || player.space_name() == name || is_previous {
        VisitType::Subsequent
    } else {
        VisitType::First
    }
}

/// Variant the player arrived at their current space with.
pub fn arrival_visit_type(player: &Player) -> VisitType {
    player.position.visit_type()
}

/// Mark a space as visited. Called for the space being left and the space
/// being entered on every move.
pub fn record_visit(player: &mut Player, name: &str) {
    player.visited.insert(normalize_name(name));
}

pub fn has_visited(player: &Player, name: &str) -> bool {
    player.visited.contains(&normalize_name(name))
}
