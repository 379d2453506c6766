//! Node registry: every space variant with lookups by id, exact name, and
//! normalized name.

use crate::error::BoardError;
use crate::space::{normalize_name, Node, NodeId, NodeRecord, VisitType};
use std::collections::HashMap;

/// Read-only store of all space variants on a board.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, usize>,
    by_exact_name: HashMap<String, Vec<usize>>,
    by_normalized: HashMap<String, Vec<usize>>,
}

impl NodeRegistry {
    /// Build the registry and its three indices.
    ///
    /// Fails if two records describe the same (name, visit variant) pair.
    pub fn register(records: impl IntoIterator<Item = NodeRecord>) -> Result<Self, BoardError> {
        let mut registry = Self::default();

        for record in records {
            let node = Node::from_record(record);
            if registry.by_id.contains_key(&node.id) {
                return Err(BoardError::DuplicateNode(node.id));
            }

            let index = registry.nodes.len();
            registry.by_id.insert(node.id.clone(), index);
            registry
                .by_exact_name
                .entry(node.name.clone())
                .or_default()
                .push(index);
            registry
                .by_normalized
                .entry(node.normalized.clone())
                .or_default()
                .push(index);
            registry.nodes.push(node);
        }

        Ok(registry)
    }

    /// Resolve a name to the variant matching `visit_type`, falling back to
    /// the only variant when the space has just one.
    pub fn resolve(&self, name: &str, visit_type: VisitType) -> Option<&Node> {
        let indices = self.by_normalized.get(&normalize_name(name))?;
        self.pick_variant(indices, visit_type)
    }

    /// Look up a caller-supplied identifier: a node id, then an exact name,
    /// then a normalized name. `visit_type` picks the variant for names.
    pub fn lookup(&self, identifier: &str, visit_type: VisitType) -> Option<&Node> {
        if let Some(node) = self.get(&NodeId(identifier.to_string())) {
            return Some(node);
        }
        if let Some(indices) = self.by_exact_name.get(identifier) {
            return self.pick_variant(indices, visit_type);
        }
        self.resolve(identifier, visit_type)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.by_id.get(id).map(|&index| &self.nodes[index])
    }

    /// First variant registered under this exact (case-sensitive) name.
    pub fn by_exact_name(&self, name: &str) -> Option<&Node> {
        self.by_exact_name
            .get(name)
            .and_then(|indices| indices.first())
            .map(|&index| &self.nodes[index])
    }

    /// All variants of a space.
    pub fn variants(&self, name: &str) -> Vec<&Node> {
        self.by_normalized
            .get(&normalize_name(name))
            .map(|indices| indices.iter().map(|&index| &self.nodes[index]).collect())
            .unwrap_or_default()
    }

    pub fn first_visit(&self, name: &str) -> Option<&Node> {
        self.resolve(name, VisitType::First)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_normalized.contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    fn pick_variant(&self, indices: &[usize], visit_type: VisitType) -> Option<&Node> {
        let matching = indices
            .iter()
            .map(|&index| &self.nodes[index])
            .find(|node| node.visit_type == visit_type);

        match matching {
            Some(node) => Some(node),
            None if indices.len() == 1 => Some(&self.nodes[indices[0]]),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Category;

    fn sample() -> NodeRegistry {
        NodeRegistry::register([
            NodeRecord::new("OWNER-SCOPE-INITIATION", VisitType::First, Category::Main)
                .with_edges(["OWNER-FUND-INITIATION"]),
            NodeRecord::new("OWNER-SCOPE-INITIATION", VisitType::Subsequent, Category::Main)
                .with_edges(["PM-DECISION-CHECK"]),
            NodeRecord::new("OWNER-FUND-INITIATION", VisitType::First, Category::Main),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_builds_indices() {
        let registry = sample();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("owner-scope-initiation"));
        assert_eq!(registry.variants("OWNER-SCOPE-INITIATION").len(), 2);
        assert!(registry.by_exact_name("OWNER-FUND-INITIATION").is_some());
        assert!(registry.by_exact_name("owner-fund-initiation").is_none());
    }

    #[test]
    fn test_resolve_by_visit_type() {
        let registry = sample();
        let first = registry
            .resolve("owner-scope-initiation", VisitType::First)
            .unwrap();
        let again = registry
            .resolve("OWNER-SCOPE-INITIATION", VisitType::Subsequent)
            .unwrap();
        assert_eq!(first.destinations().next(), Some("OWNER-FUND-INITIATION"));
        assert_eq!(again.destinations().next(), Some("PM-DECISION-CHECK"));
    }

    #[test]
    fn test_resolve_falls_back_to_only_variant() {
        let registry = sample();
        let node = registry
            .resolve("OWNER-FUND-INITIATION", VisitType::Subsequent)
            .unwrap();
        assert_eq!(node.visit_type, VisitType::First);
    }

    #[test]
    fn test_unknown_name_is_none() {
        let registry = sample();
        assert!(registry.resolve("NOWHERE", VisitType::First).is_none());
        assert!(registry.lookup("NOWHERE", VisitType::First).is_none());
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let registry = sample();
        let by_id = registry
            .lookup("OWNER-SCOPE-INITIATION:subsequent", VisitType::First)
            .unwrap();
        assert_eq!(by_id.visit_type, VisitType::Subsequent);

        let by_name = registry
            .lookup("OWNER-SCOPE-INITIATION", VisitType::Subsequent)
            .unwrap();
        assert_eq!(by_name.id, by_id.id);

        let by_normalized = registry
            .lookup("owner-scope-initiation", VisitType::First)
            .unwrap();
        assert_eq!(by_normalized.visit_type, VisitType::First);
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let result = NodeRegistry::register([
            NodeRecord::new("A-SPACE", VisitType::First, Category::Main),
            NodeRecord::new("a-space", VisitType::First, Category::Main),
        ]);
        assert!(matches!(result, Err(BoardError::DuplicateNode(_))));
    }
}
