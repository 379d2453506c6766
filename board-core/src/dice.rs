//! Dice outcomes.
//!
//! Some spaces need a die roll before the player may move. The outcome table
//! maps (space, visit variant, die face) to text that is either one or more
//! destinations, a card directive, or a time/money delta. The text is
//! classified by its shape.
//!
//! The die itself is rolled by the caller; [`roll_die`] is a convenience.

use crate::board::Board;
use crate::effects::{card_effect, Effect};
use crate::error::{BoardError, MovementError};
use crate::history;
use crate::movement::{CandidateSet, MoveCandidate, MoveSource};
use crate::player::Player;
use crate::registry::NodeRegistry;
use crate::space::{normalize_name, CardDirective, CardType, EdgeDescriptor, VisitType};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Faces on the movement die.
pub const DIE_FACES: u8 = 6;

/// What a dice row decides, taken from its outcome-shape tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceKind {
    Movement,
    Cards(CardType),
    Time,
    Fee,
    Other(String),
}

impl DiceKind {
    /// Interpret tags such as `Next Step`, `W Cards`, `Time outcomes`, `Fees Paid`.
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.trim().to_lowercase();
        if lower.is_empty() || lower.contains("next step") || lower.contains("move") {
            return DiceKind::Movement;
        }
        if lower.contains("card") {
            if let Some(card_type) = lower.chars().next().and_then(CardType::from_letter) {
                return DiceKind::Cards(card_type);
            }
        }
        if lower.contains("time") {
            return DiceKind::Time;
        }
        if lower.contains("fee") {
            return DiceKind::Fee;
        }
        DiceKind::Other(tag.trim().to_string())
    }
}

/// An already-parsed input row of the dice outcome source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceRow {
    pub space: String,
    pub visit_type: VisitType,
    /// Outcome-shape tag, e.g. `Next Step`.
    pub tag: String,
    /// One outcome per die face, face 1 first.
    pub outcomes: Vec<String>,
}

impl DiceRow {
    pub fn new<I, S>(space: impl Into<String>, visit_type: VisitType, tag: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            space: space.into(),
            visit_type,
            tag: tag.into(),
            outcomes: outcomes.into_iter().map(Into::into).collect(),
        }
    }
}

/// One validated row: a kind and exactly six outcomes.
#[derive(Debug, Clone)]
pub struct DiceEntry {
    pub kind: DiceKind,
    pub outcomes: [String; DIE_FACES as usize],
}

impl DiceEntry {
    pub fn outcome(&self, die_value: u8) -> Option<&str> {
        let index = usize::from(die_value).checked_sub(1)?;
        self.outcomes.get(index).map(String::as_str)
    }
}

/// Outcome rows keyed by (normalized space name, visit variant).
#[derive(Debug, Clone, Default)]
pub struct DiceTable {
    entries: HashMap<(String, VisitType), Vec<DiceEntry>>,
}

impl DiceTable {
    pub fn new(rows: impl IntoIterator<Item = DiceRow>) -> Result<Self, BoardError> {
        let mut entries: HashMap<(String, VisitType), Vec<DiceEntry>> = HashMap::new();

        for row in rows {
            let space = normalize_name(&row.space);
            let outcomes: [String; DIE_FACES as usize] =
                row.outcomes
                    .try_into()
                    .map_err(|outcomes: Vec<String>| BoardError::MalformedDiceRow {
                        space: space.clone(),
                        found: outcomes.len(),
                    })?;

            entries
                .entry((space, row.visit_type))
                .or_default()
                .push(DiceEntry {
                    kind: DiceKind::from_tag(&row.tag),
                    outcomes,
                });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self, space: &str, visit_type: VisitType) -> &[DiceEntry] {
        self.entries
            .get(&(normalize_name(space), visit_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_rows(&self, space: &str, visit_type: VisitType) -> bool {
        !self.entries(space, visit_type).is_empty()
    }

    /// Spaces with at least one row.
    pub fn spaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|(space, _)| space.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A classified outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceOutcome {
    Destinations(Vec<String>),
    Cards {
        card_type: CardType,
        directive: CardDirective,
    },
    /// Days added (negative saves time)
    Time(i64),
    /// Money delta (fees are negative)
    Money(i64),
    NoEffect,
    Unrecognized(String),
}

impl DiceOutcome {
    pub fn classify(text: &str, kind: &DiceKind, registry: &NodeRegistry) -> Self {
        let text = text.trim();
        let lower = text.to_lowercase();
        if text.is_empty() || text == "-" || matches!(lower.as_str(), "n/a" | "no change" | "none") {
            return DiceOutcome::NoEffect;
        }

        if text.contains(" or ") {
            let names = text
                .split(" or ")
                .filter_map(|part| EdgeDescriptor::parse(part).destination().map(str::to_string))
                .collect();
            return DiceOutcome::Destinations(names);
        }

        if let Some(name) = EdgeDescriptor::parse(text).destination() {
            if registry.contains(name) || (*kind == DiceKind::Movement && looks_like_space(name)) {
                return DiceOutcome::Destinations(vec![name.to_string()]);
            }
        }

        if let Some((directive, named_type)) = CardDirective::parse(text) {
            let tagged_type = match kind {
                DiceKind::Cards(card_type) => Some(*card_type),
                _ => None,
            };
            let Some(card_type) = named_type.or(tagged_type) else {
                return DiceOutcome::Unrecognized(text.to_string());
            };
            return DiceOutcome::Cards {
                card_type,
                directive,
            };
        }

        if let Some(amount) = parse_amount(text) {
            if lower.contains("day") || *kind == DiceKind::Time {
                return DiceOutcome::Time(amount);
            }
            if text.contains('$') || *kind == DiceKind::Fee {
                return DiceOutcome::Money(-amount);
            }
        }

        DiceOutcome::Unrecognized(text.to_string())
    }
}

/// Movement candidates and applied effects of a die roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceResolution {
    pub value: u8,
    pub moves: Vec<MoveCandidate>,
    pub effects: Vec<Effect>,
    pub diagnostics: Vec<MovementError>,
}

/// True when the player's current space has outcome rows for the visit
/// variant they arrived with and no die has been recorded this turn.
pub fn requires_dice(table: &DiceTable, player: &Player) -> bool {
    player.turn_state.die_value.is_none()
        && table.has_rows(player.space_name(), history::arrival_visit_type(player))
}

/// Look up and classify every outcome for `die_value` at the player's space.
///
/// Destination candidates failing single-choice or audit filtering are
/// dropped. Nothing is applied to the player here.
pub fn resolve(board: &Board, player: &Player, die_value: u8) -> Result<DiceResolution, MovementError> {
    if !(1..=DIE_FACES).contains(&die_value) {
        return Err(MovementError::InvalidDieValue(die_value));
    }

    let space = player.space_name();
    let visit_type = history::arrival_visit_type(player);
    let mut set = CandidateSet::new();
    let mut effects = Vec::new();

    for entry in board.dice().entries(space, visit_type) {
        let Some(text) = entry.outcome(die_value) else {
            continue;
        };

        match DiceOutcome::classify(text, &entry.kind, board.registry()) {
            DiceOutcome::Destinations(names) => {
                for name in names {
                    set.offer(board, player, &name, None, MoveSource::Dice);
                }
            }
            DiceOutcome::Cards {
                card_type,
                directive,
            } => effects.push(card_effect(card_type, directive)),
            DiceOutcome::Time(days) => effects.push(Effect::TimeChanged {
                days,
                reason: format!("{space} roll {die_value}"),
            }),
            DiceOutcome::Money(amount) => effects.push(Effect::MoneyChanged {
                amount,
                reason: format!("{space} roll {die_value}"),
            }),
            DiceOutcome::NoEffect => {}
            DiceOutcome::Unrecognized(text) => set.report(MovementError::Configuration {
                node: space.to_string(),
                reason: format!("unrecognized dice outcome '{text}'"),
            }),
        }
    }

    let (moves, diagnostics) = set.into_parts();
    Ok(DiceResolution {
        value: die_value,
        moves,
        effects,
        diagnostics,
    })
}

/// Roll the movement die.
pub fn roll_die() -> u8 {
    roll_die_with_rng(&mut rand::thread_rng())
}

/// Roll with a specific RNG (useful for testing).
pub fn roll_die_with_rng<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(1..=DIE_FACES)
}

/// Hyphenated identifier such as `REG-DOB-AUDIT`.
fn looks_like_space(token: &str) -> bool {
    token.contains('-')
        && token.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Leading signed amount: `5`, `+5 days`, `-2`, `$1,500`.
fn parse_amount(text: &str) -> Option<i64> {
    let token = text.split_whitespace().next()?;
    if !token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '$' | ','))
    {
        return None;
    }
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    let amount: i64 = digits.parse().ok()?;
    Some(if token.starts_with('-') { -amount } else { amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice;
    use crate::config::MovementRules;
    use crate::space::{Category, NodeRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Board {
        let space = |name: &str, category: Category, edges: &[&str]| {
            NodeRecord::new(name, VisitType::First, category).with_edges(edges.iter().copied())
        };
        Board::new(
            [
                space("ROLL-SPACE", Category::Main, &[]),
                space("PATH-A", Category::Main, &[]),
                space("PATH-B", Category::Main, &[]),
                space("FORK", Category::SingleChoice, &["PATH-A", "PATH-C"]),
                space("PATH-C", Category::Main, &[]),
            ],
            [
                DiceRow::new(
                    "ROLL-SPACE",
                    VisitType::First,
                    "Next Step",
                    ["PATH-A", "PATH-A or PATH-B", "PATH-B", "PATH-B", "MISSING-SPACE", "PATH-A"],
                ),
                DiceRow::new(
                    "ROLL-SPACE",
                    VisitType::First,
                    "W Cards",
                    ["Draw 1", "Draw 2", "n/a", "Remove 1", "Replace 1", "Draw 3"],
                ),
                DiceRow::new(
                    "ROLL-SPACE",
                    VisitType::First,
                    "Time outcomes",
                    ["1", "2", "3", "4", "5", "10%"],
                ),
            ],
            MovementRules::new("ROLL-SPACE"),
        )
        .unwrap()
    }

    fn names(moves: &[MoveCandidate]) -> Vec<&str> {
        moves.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_dice_kind_from_tag() {
        assert_eq!(DiceKind::from_tag("Next Step"), DiceKind::Movement);
        assert_eq!(DiceKind::from_tag("E Cards"), DiceKind::Cards(CardType::E));
        assert_eq!(DiceKind::from_tag("Time outcomes"), DiceKind::Time);
        assert_eq!(DiceKind::from_tag("Fees Paid"), DiceKind::Fee);
        assert_eq!(DiceKind::from_tag("Quality"), DiceKind::Other("Quality".to_string()));
    }

    #[test]
    fn test_classify_shapes() {
        let board = board();
        let registry = board.registry();
        let other = DiceKind::Other("Misc".to_string());

        assert_eq!(
            DiceOutcome::classify("PATH-A or PATH-B", &other, registry),
            DiceOutcome::Destinations(vec!["PATH-A".to_string(), "PATH-B".to_string()])
        );
        assert_eq!(
            DiceOutcome::classify("PATH-B", &other, registry),
            DiceOutcome::Destinations(vec!["PATH-B".to_string()])
        );
        assert_eq!(
            DiceOutcome::classify("Draw 2 E", &other, registry),
            DiceOutcome::Cards {
                card_type: CardType::E,
                directive: CardDirective::Draw(2)
            }
        );
        assert_eq!(DiceOutcome::classify("3 days", &other, registry), DiceOutcome::Time(3));
        assert_eq!(
            DiceOutcome::classify("$1,500", &other, registry),
            DiceOutcome::Money(-1_500)
        );
        assert_eq!(DiceOutcome::classify("n/a", &other, registry), DiceOutcome::NoEffect);
        assert_eq!(
            DiceOutcome::classify("Draw 2", &other, registry),
            DiceOutcome::Unrecognized("Draw 2".to_string())
        );
    }

    #[test]
    fn test_malformed_row_rejected() {
        let result = DiceTable::new([DiceRow::new(
            "ROLL-SPACE",
            VisitType::First,
            "Next Step",
            ["PATH-A", "PATH-B"],
        )]);
        assert!(matches!(
            result,
            Err(BoardError::MalformedDiceRow { found: 2, .. })
        ));
    }

    #[test]
    fn test_requires_dice_until_recorded() {
        let board = board();
        let mut player = board.new_player("Ada");
        assert!(requires_dice(board.dice(), &player));

        player.turn_state.die_value = Some(4);
        assert!(!requires_dice(board.dice(), &player));
    }

    #[test]
    fn test_resolve_or_outcome() {
        let board = board();
        let player = board.new_player("Ada");

        let resolution = resolve(&board, &player, 2).unwrap();
        assert_eq!(names(&resolution.moves), vec!["PATH-A", "PATH-B"]);
        assert!(resolution.moves.iter().all(|m| m.source == MoveSource::Dice));
        assert_eq!(
            resolution.effects,
            vec![
                Effect::CardsDrawn {
                    card_type: CardType::W,
                    count: 2
                },
                Effect::TimeChanged {
                    days: 2,
                    reason: "ROLL-SPACE roll 2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_resolve_respects_commitments() {
        let board = board();
        let mut player = board.new_player("Ada");
        choice::record_choice(&mut player, "FORK", "PATH-C");

        let resolution = resolve(&board, &player, 2).unwrap();
        assert_eq!(names(&resolution.moves), vec!["PATH-B"]);
    }

    #[test]
    fn test_resolve_reports_bad_outcomes() {
        let board = board();
        let player = board.new_player("Ada");

        let resolution = resolve(&board, &player, 5).unwrap();
        assert!(resolution.moves.is_empty());
        assert!(resolution
            .diagnostics
            .contains(&MovementError::UnresolvedDestination("MISSING-SPACE".to_string())));

        let resolution = resolve(&board, &player, 6).unwrap();
        assert!(resolution
            .diagnostics
            .iter()
            .any(|d| matches!(d, MovementError::Configuration { .. })));
    }

    #[test]
    fn test_invalid_die_value() {
        let board = board();
        let player = board.new_player("Ada");
        assert_eq!(
            resolve(&board, &player, 7).unwrap_err(),
            MovementError::InvalidDieValue(7)
        );
        assert_eq!(
            resolve(&board, &player, 0).unwrap_err(),
            MovementError::InvalidDieValue(0)
        );
    }

    #[test]
    fn test_roll_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let value = roll_die_with_rng(&mut rng);
            assert!((1..=DIE_FACES).contains(&value));
        }
        assert!((1..=DIE_FACES).contains(&roll_die()));
    }
}
