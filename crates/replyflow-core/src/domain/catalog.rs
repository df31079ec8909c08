use crate::domain::store::StoreSnapshot;
use crate::types::StepKind;

/// Applicability predicate over the data of earlier steps
pub type ApplicabilityFn = fn(&StoreSnapshot<'_>) -> bool;

/// Immutable description of a wizard step
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    /// Step kind, also the step id
    pub kind: StepKind,

    /// Rank in the canonical sequence
    pub order: usize,

    /// Human readable label
    pub label: &'static str,

    applicable: ApplicabilityFn,
}

impl StepDefinition {
    /// Step id
    pub fn id(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Whether the step is required given the data in `store`
    pub fn is_applicable(&self, store: &StoreSnapshot<'_>) -> bool {
        (self.applicable)(store)
    }
}

fn always(_: &StoreSnapshot<'_>) -> bool {
    true
}

fn comment_capable_service(store: &StoreSnapshot<'_>) -> bool {
    store
        .service_kind()
        .map_or(false, |kind| kind.is_comment_capable())
}

static CANONICAL_STEPS: [StepDefinition; 7] = [
    StepDefinition {
        kind: StepKind::Trigger,
        order: 0,
        label: "Service type",
        applicable: always,
    },
    StepDefinition {
        kind: StepKind::Platform,
        order: 1,
        label: "Platform",
        applicable: always,
    },
    StepDefinition {
        kind: StepKind::Page,
        order: 2,
        label: "Page",
        applicable: always,
    },
    StepDefinition {
        kind: StepKind::Post,
        order: 3,
        label: "Post",
        applicable: comment_capable_service,
    },
    StepDefinition {
        kind: StepKind::Keywords,
        order: 4,
        label: "Keywords",
        applicable: always,
    },
    StepDefinition {
        kind: StepKind::Response,
        order: 5,
        label: "Response",
        applicable: always,
    },
    StepDefinition {
        kind: StepKind::Config,
        order: 6,
        label: "Final settings",
        applicable: always,
    },
];

/// Static registry of the wizard's steps
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCatalog;

impl StepCatalog {
    /// Create the catalog
    pub fn new() -> Self {
        StepCatalog
    }

    /// All step definitions in canonical order
    pub fn steps_in_canonical_order(&self) -> &'static [StepDefinition] {
        &CANONICAL_STEPS
    }

    /// Number of steps in the catalog
    pub fn len(&self) -> usize {
        CANONICAL_STEPS.len()
    }

    /// The catalog is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First step of every flow
    pub fn first(&self) -> StepKind {
        CANONICAL_STEPS[0].kind
    }

    /// Definition of a step
    pub fn definition(&self, step: StepKind) -> &'static StepDefinition {
        &CANONICAL_STEPS[step.order()]
    }

    /// Whether `step` is required given the data in `store`
    pub fn applicability_of(&self, step: StepKind, store: &StoreSnapshot<'_>) -> bool {
        self.definition(step).is_applicable(store)
    }

    /// First applicable step after `step` in canonical order, skipping inapplicable ones
    pub fn next_applicable_after(&self, step: StepKind, store: &StoreSnapshot<'_>) -> Option<StepKind> {
        CANONICAL_STEPS[step.order() + 1..]
            .iter()
            .find(|definition| definition.is_applicable(store))
            .map(|definition| definition.kind)
    }

    /// Every applicable step in canonical order
    pub fn applicable_path(&self, store: &StoreSnapshot<'_>) -> Vec<StepKind> {
        CANONICAL_STEPS
            .iter()
            .filter(|definition| definition.is_applicable(store))
            .map(|definition| definition.kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::{StepPayload, TriggerConfig};
    use crate::domain::store::StepConfigStore;

    fn store_with_service(service_id: &str) -> StepConfigStore {
        let mut store = StepConfigStore::new();
        store.put(
            0,
            StepPayload::Trigger(TriggerConfig {
                service_id: service_id.to_string(),
            }),
        );
        store
    }

    #[test]
    fn test_canonical_order_matches_step_kinds() {
        let catalog = StepCatalog::new();
        let ids: Vec<&str> = catalog
            .steps_in_canonical_order()
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(
            ids,
            vec!["trigger", "platform", "page", "post", "keywords", "response", "config"]
        );
        for definition in catalog.steps_in_canonical_order() {
            assert_eq!(definition.order, definition.kind.order());
        }
    }

    #[test]
    fn test_post_applicability_follows_service_kind() {
        let catalog = StepCatalog::new();
        for (service_id, expected) in [("1", true), ("5", true), ("2", false), ("8", false)] {
            let store = store_with_service(service_id);
            assert_eq!(
                catalog.applicability_of(StepKind::Post, &store.snapshot()),
                expected,
                "service {}",
                service_id
            );
        }

        let empty = StepConfigStore::new();
        assert!(!catalog.applicability_of(StepKind::Post, &empty.snapshot()));
        assert!(catalog.applicability_of(StepKind::Keywords, &empty.snapshot()));
    }

    #[test]
    fn test_next_applicable_skips_post_for_dm_only() {
        let catalog = StepCatalog::new();
        let dm_only = store_with_service("2");
        let comment = store_with_service("1");

        assert_eq!(
            catalog.next_applicable_after(StepKind::Page, &dm_only.snapshot()),
            Some(StepKind::Keywords)
        );
        assert_eq!(
            catalog.next_applicable_after(StepKind::Page, &comment.snapshot()),
            Some(StepKind::Post)
        );
        assert_eq!(
            catalog.next_applicable_after(StepKind::Config, &comment.snapshot()),
            None
        );
    }

    #[test]
    fn test_applicable_path() {
        let catalog = StepCatalog::new();
        let dm_only = store_with_service("2");
        assert_eq!(catalog.applicable_path(&dm_only.snapshot()).len(), 6);
        let both = store_with_service("5");
        assert_eq!(catalog.applicable_path(&both.snapshot()).len(), 7);
    }
}
