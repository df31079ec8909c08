/// Flow controller facade
pub mod flow_controller;

/// Rendering snapshots
pub mod snapshot;
