//! Collaborator interfaces for the remote social-media API
//!
//! The engine only consumes these traits. Implementations live outside the
//! core (see `replyflow-state-inmemory` for a local one).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::assembler::AutomationPayload;
use crate::error::CollaboratorError;
use crate::types::RequestContext;

/// A connected social platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    /// Platform id
    pub platform_id: String,
    /// Display name
    pub platform_name: String,
}

/// A page on a connected platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page id
    pub page_id: String,
    /// Display name
    pub page_name: String,
    /// Platform the page belongs to
    pub platform_id: String,
}

/// An auto-reply service kind offered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceKindSummary {
    /// Service id ("1", "2", "5", ...)
    pub id: String,
    /// Display name
    pub name: String,
    /// Replies allowed per day
    #[serde(rename = "dailyLimit", alias = "daily_limit")]
    pub daily_limit: u32,
}

/// A post published on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePost {
    /// Post id
    pub post_id: String,
    /// Post text
    pub text: String,
    /// Publication time
    pub created_time: DateTime<Utc>,
}

/// Automation record as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAutomation {
    /// Backend-assigned id
    pub id: String,
    /// Payload the automation was created from
    pub payload: AutomationPayload,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Read-only directory lookups backing the step pickers
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// List connected platforms
    async fn list_platforms(&self, ctx: &RequestContext) -> Result<Vec<PlatformSummary>, CollaboratorError>;

    /// List pages, optionally restricted to one platform
    async fn list_pages(
        &self,
        ctx: &RequestContext,
        platform_id: Option<String>,
    ) -> Result<Vec<PageSummary>, CollaboratorError>;

    /// List the auto-reply service kinds
    async fn list_auto_reply_service_kinds(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ServiceKindSummary>, CollaboratorError>;

    /// List the posts of a page
    async fn list_page_posts(
        &self,
        ctx: &RequestContext,
        page_id: &str,
    ) -> Result<Vec<PagePost>, CollaboratorError>;
}

/// Persists assembled automations
#[async_trait]
pub trait AutomationService: Send + Sync {
    /// Create an automation from a validated payload
    async fn create_automation(
        &self,
        ctx: &RequestContext,
        payload: &AutomationPayload,
    ) -> Result<CreatedAutomation, CollaboratorError>;
}
