//!
//! Replyflow Core - step-based auto-reply automation builder
//!
//! This crate holds the step catalog, the per-flow configuration store, the
//! transition engine that grows and prunes a flow's step graph, the payload
//! assembler that folds step data into an automation, and the controller
//! facade that ties them to the external collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - step catalog, flow instance, transitions, assembly
pub mod domain;

/// Application services - controller facade and snapshots
pub mod application;

/// Core types
pub mod types;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

// Re-export key types
pub use config::FlowConfig;
pub use error::{CollaboratorError, CoreError};
pub use types::{RequestContext, ServiceKind, StepKind};

pub use application::flow_controller::{FlowController, StepOptions, SubmitOutcome};
pub use application::snapshot::{FlowSnapshot, StepSnapshot};

pub use domain::assembler::{AutomationPayload, PayloadAssembler, ValidationFailure, ValidationReport};
pub use domain::catalog::{StepCatalog, StepDefinition};
pub use domain::events::DomainEvent;
pub use domain::flow_instance::{FlowEdge, FlowInstance, FlowInstanceId, FlowStep, StepState};
pub use domain::payload::StepPayload;
pub use domain::services::{
    AutomationService, CreatedAutomation, DirectoryService, PagePost, PageSummary, PlatformSummary,
    ServiceKindSummary,
};
pub use domain::store::{StepConfigStore, StoreSnapshot};
pub use domain::transition::{Advance, TransitionEngine};
