//! Reconciliation cycle
//!
//! Applies the match engine to every currently known item and produces the
//! data handed to the presentation adapter. The cycle is total and
//! idempotent: the same items and filters always give the same map.

use std::collections::BTreeMap;

use log::debug;

use crate::matcher::Matcher;
use crate::types::{Filters, Item, Mode};

/// Item id -> hidden.
pub type DecisionMap = BTreeMap<String, bool>;

/// Source of the items currently on the page.
pub trait ItemSource {
    fn items(&self) -> Vec<Item>;
}

/// Renders decisions and filter state. The core never inspects its output.
pub trait Presenter {
    fn render(&mut self, view: &RenderModel);
}

/// Everything the presentation adapter needs after a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub decisions: DecisionMap,
    /// Number of entries in the active set
    pub size: usize,
    pub mode: Mode,
    /// Active entries, for rendering removable chips
    pub entries: Vec<String>,
}

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    pub total: usize,
    pub hidden: usize,
    /// Whether the decision map differs from the previous cycle
    pub changed: bool,
}

/// Decide visibility for each item.
pub fn reconcile(items: &[Item], filters: &Filters, use_partial_match: bool) -> DecisionMap {
    let matcher = Matcher::new(filters, use_partial_match);
    items
        .iter()
        .map(|item| {
            let hidden = matcher.should_hide(item.classification.as_deref());
            (item.id.clone(), hidden)
        })
        .collect()
}

/// Runs cycles and remembers the last decision map.
#[derive(Debug, Default)]
pub struct Reconciler {
    last: Option<DecisionMap>,
    cycles: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(
        &mut self,
        items: &[Item],
        filters: &Filters,
        use_partial_match: bool,
    ) -> (RenderModel, CycleOutcome) {
        let decisions = reconcile(items, filters, use_partial_match);
        let outcome = CycleOutcome {
            total: decisions.len(),
            hidden: decisions.values().filter(|&&hidden| hidden).count(),
            changed: self.last.as_ref() != Some(&decisions),
        };

        self.cycles += 1;
        debug!(
            "Cycle {}: {} items, {} hidden, changed={}",
            self.cycles, outcome.total, outcome.hidden, outcome.changed
        );

        self.last = Some(decisions.clone());
        let view = RenderModel {
            decisions,
            size: filters.size(),
            mode: filters.mode,
            entries: filters.active().to_vec(),
        };
        (view, outcome)
    }

    pub fn last(&self) -> Option<&DecisionMap> {
        self.last.as_ref()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        vec![
            Item::new("a1", "Chaos Orb"),
            Item::new("b2", "Two-Stone Ring"),
            Item::new("c3", "Leather Belt"),
            Item::unclassified("d4"),
            Item::new("e5", "   "),
        ]
    }

    #[test]
    fn test_reconcile_blacklist() {
        let filters = Filters {
            exclude: ["Chaos Orb"].into_iter().collect(),
            ..Filters::default()
        };
        let decisions = reconcile(&items(), &filters, false);
        assert_eq!(decisions.len(), 5);
        assert!(decisions["a1"]);
        assert!(!decisions["b2"]);
        assert!(!decisions["d4"]);
        assert!(!decisions["e5"]);
    }

    #[test]
    fn test_reconcile_whitelist_keeps_unclassified_visible() {
        let filters = Filters {
            include: ["Ring"].into_iter().collect(),
            mode: Mode::Whitelist,
            ..Filters::default()
        };
        let decisions = reconcile(&items(), &filters, true);
        assert!(decisions["a1"]);
        assert!(!decisions["b2"]);
        assert!(decisions["c3"]);
        assert!(!decisions["d4"]);
        assert!(!decisions["e5"]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let filters = Filters {
            exclude: ["Ring", "Belt"].into_iter().collect(),
            ..Filters::default()
        };
        let mut reconciler = Reconciler::new();
        let (first, outcome1) = reconciler.run(&items(), &filters, true);
        let (second, outcome2) = reconciler.run(&items(), &filters, true);

        assert_eq!(first, second);
        assert!(outcome1.changed);
        assert!(!outcome2.changed);
        assert_eq!(outcome2.hidden, 2);
        assert_eq!(reconciler.cycles(), 2);
    }

    #[test]
    fn test_render_model_reflects_active_set() {
        let filters = Filters {
            exclude: ["Chaos Orb"].into_iter().collect(),
            include: ["Ring", "Belt"].into_iter().collect(),
            mode: Mode::Whitelist,
        };
        let (view, _) = Reconciler::new().run(&[], &filters, false);
        assert!(view.decisions.is_empty());
        assert_eq!(view.size, 2);
        assert_eq!(view.mode, Mode::Whitelist);
        assert_eq!(view.entries, vec!["Belt".to_string(), "Ring".to_string()]);
    }

    #[test]
    fn test_changed_after_item_list_grows() {
        let filters = Filters::default();
        let mut reconciler = Reconciler::new();
        let mut list = items();
        reconciler.run(&list, &filters, false);
        list.push(Item::new("f6", "Divine Orb"));
        let (_, outcome) = reconciler.run(&list, &filters, false);
        assert!(outcome.changed);
        assert_eq!(outcome.total, 6);
        assert_eq!(reconciler.last().map(|m| m.len()), Some(6));
    }
}
