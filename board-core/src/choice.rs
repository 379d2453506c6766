//! Single-choice commitments.
//!
//! The first destination chosen at a fork binds every later visit: the other
//! original options of that fork are excluded wherever they show up again.

use crate::history;
use crate::player::Player;
use crate::registry::NodeRegistry;
use crate::space::normalize_name;

/// Normalized destination names of the fork's first-visit variant.
pub fn fork_options(registry: &NodeRegistry, fork: &str) -> Vec<String> {
    registry
        .first_visit(fork)
        .map(|node| node.destinations().map(normalize_name).collect())
        .unwrap_or_default()
}

pub fn committed_choice<'p>(player: &'p Player, fork: &str) -> Option<&'p str> {
    player.choice_for(fork)
}

/// Record the destination chosen at a fork. First write wins; returns `true`
/// only when a new commitment was stored.
pub fn record_choice(player: &mut Player, fork: &str, destination: &str) -> bool {
    let fork = normalize_name(fork);
    if player.choices.contains_key(&fork) {
        return false;
    }
    player.choices.insert(fork, normalize_name(destination));
    true
}

/// True when `candidate` is an original option of some committed fork but not
/// the option that was chosen there.
pub fn conflicts(registry: &NodeRegistry, player: &Player, candidate: &str) -> bool {
    let candidate = normalize_name(candidate);
    player.choices.iter().any(|(fork, chosen)| {
        *chosen != candidate && fork_options(registry, fork).contains(&candidate)
    })
}

/// Recover a commitment that was never recorded explicitly: the original
/// option the player has already visited. The inference is persisted.
pub fn infer_choice(registry: &NodeRegistry, player: &mut Player, fork: &str) -> Option<String> {
    if let Some(choice) = committed_choice(player, fork) {
        return Some(choice.to_string());
    }

    let inferred = fork_options(registry, fork)
        .into_iter()
        .find(|option| history::has_visited(player, option))?;

    tracing::debug!(fork, choice = %inferred, "inferred single-choice commitment from history");
    record_choice(player, fork, &inferred);
    Some(inferred)
}
