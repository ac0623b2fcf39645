//! Per-calculation component choices.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::component::ComponentId;

/// Which alternatives and optional lines the customer picked.
///
/// Lives inside the configuration aggregate and is rebuilt empty whenever
/// the package changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// base component id → chosen alternative id (absent = base selected)
    #[serde(default)]
    pub alternatives: BTreeMap<ComponentId, ComponentId>,

    /// Optional component ids switched on
    #[serde(default)]
    pub selected_optional: BTreeSet<ComponentId>,
}

impl SelectionState {
    pub fn alternative_for(&self, base: ComponentId) -> Option<ComponentId> {
        self.alternatives.get(&base).copied()
    }

    pub fn is_optional_selected(&self, id: ComponentId) -> bool {
        self.selected_optional.contains(&id)
    }

    pub fn with_alternative(&self, base: ComponentId, alternative: ComponentId) -> Self {
        let mut next = self.clone();
        next.alternatives.insert(base, alternative);
        next
    }

    pub fn without_alternative(&self, base: ComponentId) -> Self {
        let mut next = self.clone();
        next.alternatives.remove(&base);
        next
    }

    pub fn with_optional(&self, id: ComponentId, selected: bool) -> Self {
        let mut next = self.clone();
        if selected {
            next.selected_optional.insert(id);
        } else {
            next.selected_optional.remove(&id);
        }
        next
    }

    pub fn toggled_optional(&self, id: ComponentId) -> Self {
        self.with_optional(id, !self.is_optional_selected(id))
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty() && self.selected_optional.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_on_write() {
        let empty = SelectionState::default();
        let picked = empty.with_alternative(1, 2).toggled_optional(7);
        assert!(empty.is_empty());
        assert_eq!(picked.alternative_for(1), Some(2));
        assert!(picked.is_optional_selected(7));

        let cleared = picked.without_alternative(1).toggled_optional(7);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let s = SelectionState::default().with_alternative(10, 12).with_optional(30, true);
        let json = serde_json::to_string(&s).unwrap();
        let back: SelectionState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
