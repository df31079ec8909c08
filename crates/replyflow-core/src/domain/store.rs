use crate::domain::payload::{
    KeywordsConfig, PageConfig, PlatformConfig, PostConfig, ResponseConfig, SettingsConfig,
    StepPayload, TriggerConfig,
};
use crate::types::{ServiceKind, StepKind};
use std::collections::HashMap;

/// A stored step payload together with the instantiation index of its step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredConfig {
    /// Position of the owning step in the flow at instantiation time
    pub step_index: usize,

    /// Payload produced by completing the step
    pub payload: StepPayload,
}

/// Keyed store of the payloads produced by completed steps
///
/// Writes are total replacements. A caller that wants field-level merging
/// merges before calling [`StepConfigStore::put`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepConfigStore {
    entries: HashMap<StepKind, StoredConfig>,
}

impl StepConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(StepKind::ALL.len()),
        }
    }

    /// Insert or overwrite the payload for the payload's step.
    ///
    /// Returns the replaced payload, if any.
    pub fn put(&mut self, step_index: usize, payload: StepPayload) -> Option<StepPayload> {
        self.entries
            .insert(payload.kind(), StoredConfig { step_index, payload })
            .map(|previous| previous.payload)
    }

    /// Payload stored for a step
    pub fn get(&self, step: StepKind) -> Option<&StepPayload> {
        self.entries.get(&step).map(|entry| &entry.payload)
    }

    /// Whether a payload is stored for a step
    pub fn contains(&self, step: StepKind) -> bool {
        self.entries.contains_key(&step)
    }

    /// Instantiation index recorded with a step's payload
    pub fn step_index_of(&self, step: StepKind) -> Option<usize> {
        self.entries.get(&step).map(|entry| entry.step_index)
    }

    /// Remove every entry whose step index is at or after `step_index`.
    ///
    /// Returns the removed steps in canonical order.
    pub fn remove_from(&mut self, step_index: usize) -> Vec<StepKind> {
        let mut removed: Vec<StepKind> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.step_index >= step_index)
            .map(|(step, _)| *step)
            .collect();
        removed.sort();

        for step in &removed {
            self.entries.remove(step);
        }
        removed
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored payloads
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view used by applicability predicates and the assembler
    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            entries: &self.entries,
        }
    }
}

/// Borrowed, read-only view of a [`StepConfigStore`]
#[derive(Debug, Clone, Copy)]
pub struct StoreSnapshot<'a> {
    entries: &'a HashMap<StepKind, StoredConfig>,
}

impl<'a> StoreSnapshot<'a> {
    /// Payload stored for a step
    pub fn get(&self, step: StepKind) -> Option<&'a StepPayload> {
        self.entries.get(&step).map(|entry| &entry.payload)
    }

    /// Whether a payload is stored for a step
    pub fn contains(&self, step: StepKind) -> bool {
        self.entries.contains_key(&step)
    }

    /// Service kind selected by the trigger step
    pub fn service_kind(&self) -> Option<ServiceKind> {
        self.trigger().and_then(TriggerConfig::service_kind)
    }

    /// Trigger step data
    pub fn trigger(&self) -> Option<&'a TriggerConfig> {
        match self.get(StepKind::Trigger) {
            Some(StepPayload::Trigger(config)) => Some(config),
            _ => None,
        }
    }

    /// Platform step data
    pub fn platform(&self) -> Option<&'a PlatformConfig> {
        match self.get(StepKind::Platform) {
            Some(StepPayload::Platform(config)) => Some(config),
            _ => None,
        }
    }

    /// Page step data
    pub fn page(&self) -> Option<&'a PageConfig> {
        match self.get(StepKind::Page) {
            Some(StepPayload::Page(config)) => Some(config),
            _ => None,
        }
    }

    /// Post step data
    pub fn post(&self) -> Option<&'a PostConfig> {
        match self.get(StepKind::Post) {
            Some(StepPayload::Post(config)) => Some(config),
            _ => None,
        }
    }

    /// Keywords step data
    pub fn keywords(&self) -> Option<&'a KeywordsConfig> {
        match self.get(StepKind::Keywords) {
            Some(StepPayload::Keywords(config)) => Some(config),
            _ => None,
        }
    }

    /// Response step data
    pub fn response(&self) -> Option<&'a ResponseConfig> {
        match self.get(StepKind::Response) {
            Some(StepPayload::Response(config)) => Some(config),
            _ => None,
        }
    }

    /// Final settings step data
    pub fn settings(&self) -> Option<&'a SettingsConfig> {
        match self.get(StepKind::Config) {
            Some(StepPayload::Config(config)) => Some(config),
            _ => None,
        }
    }
}
