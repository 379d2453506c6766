//! Board space types.
//!
//! Contains the types that describe the movement graph: node identity, visit
//! variants, space categories, edge descriptors, and card directives. Raw edge
//! text is parsed into an [`EdgeDescriptor`] exactly once, when a [`Node`] is
//! built from its [`NodeRecord`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum number of outgoing edge slots a space may declare.
pub const MAX_EDGE_SLOTS: usize = 5;

/// Tokens that stand for "the outgoing edges of the stored origin space".
const ORIGIN_TOKENS: [&str; 2] = ["original space", "original-space"];

/// Normalize a space name for comparisons: trimmed, upper-case, single spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

// ============================================================================
// ID Types
// ============================================================================

/// Visit variant of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisitType {
    #[default]
    #[serde(alias = "First")]
    First,
    #[serde(alias = "Subsequent")]
    Subsequent,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::First => "first",
            VisitType::Subsequent => "subsequent",
        }
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique identifier for one (space, visit variant) pair, e.g. `PM-DECISION-CHECK:first`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(name: &str, visit_type: VisitType) -> Self {
        Self(format!("{}:{}", normalize_name(name), visit_type.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized space name part of the id.
    pub fn name(&self) -> &str {
        self.0
            .rsplit_once(':')
            .map(|(name, _)| name)
            .unwrap_or(&self.0)
    }

    pub fn visit_type(&self) -> VisitType {
        match self.0.rsplit_once(':') {
            Some((_, "subsequent")) => VisitType::Subsequent,
            _ => VisitType::First,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Path category of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    Main,
    SingleChoice,
    Logic,
    SideQuest,
    Special,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::SingleChoice => "single-choice",
            Category::Logic => "logic",
            Category::SideQuest => "side-quest",
            Category::Special => "special",
        }
    }

    pub fn is_side_quest(&self) -> bool {
        matches!(self, Category::SideQuest)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Edge Descriptors
// ============================================================================

/// A single outgoing edge slot, parsed from its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDescriptor {
    /// A bare destination name.
    Plain(String),
    /// A destination name followed by free text.
    WithDescription { name: String, description: String },
    /// Substitute the outgoing edges of the player's stored origin space.
    OriginReference,
    /// An embedded yes/no question (logic spaces).
    Question(String),
    /// Stay-and-skip marker.
    Negotiate,
    /// Empty or `n/a` slot.
    Empty,
}

impl EdgeDescriptor {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() || text == "-" || text.eq_ignore_ascii_case("n/a") {
            return EdgeDescriptor::Empty;
        }
        if text.contains('?') && text.contains("YES") {
            return EdgeDescriptor::Question(text.to_string());
        }

        let lower = text.to_lowercase();
        if ORIGIN_TOKENS.contains(&lower.as_str()) {
            return EdgeDescriptor::OriginReference;
        }
        if lower == "negotiate" {
            return EdgeDescriptor::Negotiate;
        }

        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (text, ""),
        };
        let description = rest.trim().trim_start_matches('-').trim();
        if description.is_empty() {
            EdgeDescriptor::Plain(name.to_string())
        } else {
            EdgeDescriptor::WithDescription {
                name: name.to_string(),
                description: description.to_string(),
            }
        }
    }

    /// Destination name for plain edges, `None` for control tokens.
    pub fn destination(&self) -> Option<&str> {
        match self {
            EdgeDescriptor::Plain(name) | EdgeDescriptor::WithDescription { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            EdgeDescriptor::WithDescription { description, .. } => Some(description),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EdgeDescriptor::Empty)
    }
}

// ============================================================================
// Cards
// ============================================================================

/// The five card decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    /// Work
    W,
    /// Bank
    B,
    /// Investor
    I,
    /// Life
    L,
    /// Expeditor
    E,
}

impl CardType {
    pub fn all() -> [CardType; 5] {
        [CardType::W, CardType::B, CardType::I, CardType::L, CardType::E]
    }

    pub fn letter(&self) -> char {
        match self {
            CardType::W => 'W',
            CardType::B => 'B',
            CardType::I => 'I',
            CardType::L => 'L',
            CardType::E => 'E',
        }
    }

    pub fn from_letter(letter: char) -> Option<CardType> {
        match letter.to_ascii_uppercase() {
            'W' => Some(CardType::W),
            'B' => Some(CardType::B),
            'I' => Some(CardType::I),
            'L' => Some(CardType::L),
            'E' => Some(CardType::E),
            _ => None,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// What to do with a deck when a directive fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardDirective {
    Draw(u32),
    Remove(u32),
    Replace(u32),
}

impl CardDirective {
    /// Parse directives such as `Draw 3`, `Return 1`, `Replace 2 E`.
    ///
    /// Returns the directive and the card type, when the text names one.
    pub fn parse(text: &str) -> Option<(CardDirective, Option<CardType>)> {
        let mut tokens = text.split_whitespace();
        let verb = tokens.next()?.to_lowercase();
        let count: u32 = tokens.next()?.parse().ok()?;

        let directive = match verb.as_str() {
            "draw" => CardDirective::Draw(count),
            "remove" | "return" | "discard" => CardDirective::Remove(count),
            "replace" => CardDirective::Replace(count),
            _ => return None,
        };

        let card_type = tokens.next().and_then(|token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) => CardType::from_letter(letter),
                _ => None,
            }
        });

        Some((directive, card_type))
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// An already-parsed input row describing one space variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub visit_type: VisitType,
    pub category: Category,
    #[serde(default)]
    pub edges: Vec<String>,
    /// Days spent on arrival.
    #[serde(default)]
    pub time: u32,
    /// Fee paid on arrival.
    #[serde(default)]
    pub fee: i64,
    /// Raw card directive text per deck.
    #[serde(default)]
    pub cards: BTreeMap<CardType, String>,
    #[serde(default)]
    pub negotiate: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, visit_type: VisitType, category: Category) -> Self {
        Self {
            name: name.into(),
            visit_type,
            category,
            ..Self::default()
        }
    }

    pub fn with_edges<I, S>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges = edges.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time(mut self, days: u32) -> Self {
        self.time = days;
        self
    }

    pub fn with_fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_card(mut self, card_type: CardType, directive: impl Into<String>) -> Self {
        self.cards.insert(card_type, directive.into());
        self
    }

    pub fn negotiable(mut self) -> Self {
        self.negotiate = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One space variant in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Name exactly as it appeared in the source record.
    pub name: String,
    pub normalized: String,
    pub visit_type: VisitType,
    pub category: Category,
    pub edges: Vec<EdgeDescriptor>,
    /// Edge text as given, kept for `edge N` references in logic questions.
    pub raw_edges: Vec<String>,
    pub time: u32,
    pub fee: i64,
    pub cards: Vec<(CardType, CardDirective)>,
    pub negotiate: bool,
    pub description: Option<String>,
}

impl Node {
    pub fn from_record(record: NodeRecord) -> Self {
        let normalized = normalize_name(&record.name);

        if record.edges.len() > MAX_EDGE_SLOTS {
            tracing::warn!(
                space = %normalized,
                declared = record.edges.len(),
                "space declares more edge slots than supported, extra slots ignored"
            );
        }
        let raw_edges: Vec<String> = record.edges.into_iter().take(MAX_EDGE_SLOTS).collect();
        let edges = raw_edges.iter().map(|e| EdgeDescriptor::parse(e)).collect();

        let cards = record
            .cards
            .iter()
            .filter_map(|(card_type, text)| match CardDirective::parse(text) {
                Some((directive, _)) => Some((*card_type, directive)),
                None => {
                    let text = text.trim();
                    if !text.is_empty() && !text.eq_ignore_ascii_case("n/a") {
                        tracing::warn!(space = %normalized, card = %card_type, text = %text, "unrecognized card directive");
                    }
                    None
                }
            })
            .collect();

        Self {
            id: NodeId::new(&record.name, record.visit_type),
            name: record.name,
            normalized,
            visit_type: record.visit_type,
            category: record.category,
            edges,
            raw_edges,
            time: record.time,
            fee: record.fee,
            cards,
            negotiate: record.negotiate,
            description: record.description,
        }
    }

    /// Destination names of plain edge slots, in slot order.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().filter_map(EdgeDescriptor::destination)
    }

    /// Question texts of logic edge slots, in slot order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().filter_map(|edge| match edge {
            EdgeDescriptor::Question(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_questions(&self) -> bool {
        self.questions().next().is_some()
    }

    pub fn has_origin_reference(&self) -> bool {
        self.edges
            .iter()
            .any(|edge| matches!(edge, EdgeDescriptor::OriginReference))
    }

    pub fn allows_negotiation(&self) -> bool {
        self.negotiate
            || self
                .edges
                .iter()
                .any(|edge| matches!(edge, EdgeDescriptor::Negotiate))
    }

    /// True when every edge slot is empty.
    pub fn declares_no_edges(&self) -> bool {
        self.edges.iter().all(EdgeDescriptor::is_empty)
    }

    /// Raw text of the 1-based edge slot `ordinal`.
    pub fn edge_slot(&self, ordinal: usize) -> Option<&str> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.raw_edges.get(index))
            .map(String::as_str)
    }
}
