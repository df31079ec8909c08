/// Static step registry and applicability rules
pub mod catalog;

/// Typed step payloads
pub mod payload;

/// Per-flow configuration store
pub mod store;

/// Flow instance aggregate: steps, edges, store
pub mod flow_instance;

/// Domain events
pub mod events;

/// Step transitions and cascade deletion
pub mod transition;

/// Payload assembly and validation
pub mod assembler;

/// Collaborator interfaces
pub mod services;
