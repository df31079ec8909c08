//! Testing utilities for replyflow.
//!
//! This crate provides standardized testing utilities for replyflow,
//! including mocks of the collaborator services, a controller builder,
//! assertion utilities, and step data generators.

pub mod assertions;
pub mod builders;
pub mod data_generators;
pub mod mocks;

/// Re-export commonly used types for convenience
pub use mockall;

pub use builders::TestControllerBuilder;
pub use mocks::{MockAutomationService, MockDirectoryService};
