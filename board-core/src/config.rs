//! Movement rules configuration.
//!
//! Names the spaces that carry special behavior on a particular board: the
//! start space, side-quest checkpoints and their bypass destinations, the
//! audit overlay, and finish spaces.

use crate::space::normalize_name;
use serde::{Deserialize, Serialize};

/// Spaces that drive the audit overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRules {
    /// Landing here starts an audit.
    pub audit_space: String,
    /// Leaving this space toward anything but the audit or itself ends it.
    pub resolution_space: String,
    /// Fork whose commitment is stored on entry and restored on resolution.
    pub fork_space: String,
    /// Always excluded while an audit is active.
    pub fast_destination: String,
    /// Always permitted while an audit is active.
    pub slow_destination: String,
}

impl AuditRules {
    pub fn new(
        audit_space: impl Into<String>,
        resolution_space: impl Into<String>,
        fork_space: impl Into<String>,
        fast_destination: impl Into<String>,
        slow_destination: impl Into<String>,
    ) -> Self {
        Self {
            audit_space: audit_space.into(),
            resolution_space: resolution_space.into(),
            fork_space: fork_space.into(),
            fast_destination: fast_destination.into(),
            slow_destination: slow_destination.into(),
        }
    }

    pub fn is_audit_space(&self, name: &str) -> bool {
        same_space(&self.audit_space, name)
    }

    pub fn is_resolution_space(&self, name: &str) -> bool {
        same_space(&self.resolution_space, name)
    }

    pub fn is_fast(&self, name: &str) -> bool {
        same_space(&self.fast_destination, name)
    }

    pub fn is_slow(&self, name: &str) -> bool {
        same_space(&self.slow_destination, name)
    }

    fn spaces(&self) -> [&str; 5] {
        [
            &self.audit_space,
            &self.resolution_space,
            &self.fork_space,
            &self.fast_destination,
            &self.slow_destination,
        ]
    }
}

/// Board-specific movement rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRules {
    /// Where new players start.
    pub start_space: String,

    /// Decision checkpoints that can re-expose a stored origin's moves.
    pub checkpoints: Vec<String>,

    /// Point-of-no-return destinations out of a checkpoint.
    pub bypass_destinations: Vec<String>,

    pub audit: Option<AuditRules>,

    /// End-of-game spaces; having no moves there is not an error.
    pub finish_spaces: Vec<String>,

    /// Emergency destination for spaces whose edges resolve to nothing.
    /// Defaults to the start space.
    pub fallback_space: Option<String>,

    /// Days added when a player negotiates instead of moving.
    pub negotiate_penalty_days: u32,

    pub starting_money: i64,
}

impl MovementRules {
    pub fn new(start_space: impl Into<String>) -> Self {
        Self {
            start_space: start_space.into(),
            checkpoints: Vec::new(),
            bypass_destinations: Vec::new(),
            audit: None,
            finish_spaces: Vec::new(),
            fallback_space: None,
            negotiate_penalty_days: 1,
            starting_money: 0,
        }
    }

    pub fn with_checkpoint(mut self, space: impl Into<String>) -> Self {
        self.checkpoints.push(space.into());
        self
    }

    pub fn with_bypass_destination(mut self, space: impl Into<String>) -> Self {
        self.bypass_destinations.push(space.into());
        self
    }

    pub fn with_audit(mut self, audit: AuditRules) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_finish_space(mut self, space: impl Into<String>) -> Self {
        self.finish_spaces.push(space.into());
        self
    }

    pub fn with_fallback_space(mut self, space: impl Into<String>) -> Self {
        self.fallback_space = Some(space.into());
        self
    }

    pub fn with_negotiate_penalty(mut self, days: u32) -> Self {
        self.negotiate_penalty_days = days;
        self
    }

    pub fn with_starting_money(mut self, money: i64) -> Self {
        self.starting_money = money;
        self
    }

    pub fn is_checkpoint(&self, name: &str) -> bool {
        self.checkpoints.iter().any(|c| same_space(c, name))
    }

    pub fn is_bypass(&self, name: &str) -> bool {
        self.bypass_destinations.iter().any(|b| same_space(b, name))
    }

    pub fn is_finish(&self, name: &str) -> bool {
        self.finish_spaces.iter().any(|f| same_space(f, name))
    }

    pub fn fallback(&self) -> &str {
        self.fallback_space.as_deref().unwrap_or(&self.start_space)
    }

    /// Every space name these rules refer to.
    pub fn configured_spaces(&self) -> Vec<&str> {
        let mut spaces = vec![self.start_space.as_str()];
        spaces.extend(self.checkpoints.iter().map(String::as_str));
        spaces.extend(self.bypass_destinations.iter().map(String::as_str));
        spaces.extend(self.finish_spaces.iter().map(String::as_str));
        spaces.extend(self.fallback_space.as_deref());
        if let Some(audit) = &self.audit {
            spaces.extend(audit.spaces());
        }
        spaces
    }
}

fn same_space(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}
