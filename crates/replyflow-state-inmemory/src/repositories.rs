use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use replyflow_core::{
    AutomationPayload, AutomationService, CollaboratorError, CreatedAutomation, DirectoryService,
    PagePost, PageSummary, PlatformSummary, RequestContext, ServiceKindSummary,
};

use crate::DirectoryData;

/// Token check shared by every in-memory service
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    required_token: Option<String>,
}

impl AccessPolicy {
    /// Accept every caller
    pub fn open() -> Self {
        Self::default()
    }

    /// Accept only callers presenting `token`
    pub fn with_required_token(token: impl Into<String>) -> Self {
        Self {
            required_token: Some(token.into()),
        }
    }

    fn authorize(&self, ctx: &RequestContext) -> Result<(), CollaboratorError> {
        match (&self.required_token, &ctx.auth_token) {
            (None, _) => Ok(()),
            (Some(required), Some(presented)) if required == presented => Ok(()),
            (Some(_), Some(_)) => Err(CollaboratorError::new("invalid auth token")),
            (Some(_), None) => Err(CollaboratorError::new("missing auth token")),
        }
    }
}

/// In-memory implementation of the DirectoryService
pub struct InMemoryDirectoryService {
    directory: Arc<RwLock<DirectoryData>>,
    policy: AccessPolicy,
}

impl InMemoryDirectoryService {
    /// Create a new in-memory directory service
    pub fn new(directory: Arc<RwLock<DirectoryData>>, policy: AccessPolicy) -> Self {
        Self { directory, policy }
    }
}

#[async_trait]
impl DirectoryService for InMemoryDirectoryService {
    async fn list_platforms(&self, ctx: &RequestContext) -> Result<Vec<PlatformSummary>, CollaboratorError> {
        self.policy.authorize(ctx)?;
        let directory = self.directory.read().await;
        Ok(directory.platforms.clone())
    }

    async fn list_pages(
        &self,
        ctx: &RequestContext,
        platform_id: Option<String>,
    ) -> Result<Vec<PageSummary>, CollaboratorError> {
        self.policy.authorize(ctx)?;
        let directory = self.directory.read().await;

        let pages = directory
            .pages
            .iter()
            .filter(|page| platform_id.as_ref().map_or(true, |id| &page.platform_id == id))
            .cloned()
            .collect();
        Ok(pages)
    }

    async fn list_auto_reply_service_kinds(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ServiceKindSummary>, CollaboratorError> {
        self.policy.authorize(ctx)?;
        let directory = self.directory.read().await;
        Ok(directory.service_kinds.clone())
    }

    async fn list_page_posts(
        &self,
        ctx: &RequestContext,
        page_id: &str,
    ) -> Result<Vec<PagePost>, CollaboratorError> {
        self.policy.authorize(ctx)?;
        let directory = self.directory.read().await;

        if !directory.pages.iter().any(|page| page.page_id == page_id) {
            return Err(CollaboratorError::new(format!("page {} not found", page_id)));
        }

        let mut posts = directory.posts.get(page_id).cloned().unwrap_or_default();
        posts.sort_by(|a, b| b.created_time.cmp(&a.created_time));
        Ok(posts)
    }
}

/// In-memory implementation of the AutomationService
///
/// Checks the payload's references against the shared directory the way the
/// remote API does, and keeps every created automation.
pub struct InMemoryAutomationService {
    directory: Arc<RwLock<DirectoryData>>,
    automations: Arc<RwLock<HashMap<String, CreatedAutomation>>>,
    outage: Arc<RwLock<Option<String>>>,
    policy: AccessPolicy,
}

impl InMemoryAutomationService {
    /// Create a new in-memory automation service
    pub fn new(
        directory: Arc<RwLock<DirectoryData>>,
        automations: Arc<RwLock<HashMap<String, CreatedAutomation>>>,
        outage: Arc<RwLock<Option<String>>>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            directory,
            automations,
            outage,
            policy,
        }
    }

    async fn check_references(&self, payload: &AutomationPayload) -> Result<(), CollaboratorError> {
        let directory = self.directory.read().await;

        if !directory
            .service_kinds
            .iter()
            .any(|kind| kind.id == payload.service_id)
        {
            return Err(CollaboratorError::new(format!(
                "unknown service {}",
                payload.service_id
            )));
        }
        if !directory
            .platforms
            .iter()
            .any(|platform| platform.platform_id == payload.platform_id)
        {
            return Err(CollaboratorError::new(format!(
                "platform {} is not connected",
                payload.platform_id
            )));
        }
        if !directory
            .pages
            .iter()
            .any(|page| page.page_id == payload.page_id && page.platform_id == payload.platform_id)
        {
            return Err(CollaboratorError::new(format!(
                "page {} not found on platform {}",
                payload.page_id, payload.platform_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AutomationService for InMemoryAutomationService {
    async fn create_automation(
        &self,
        ctx: &RequestContext,
        payload: &AutomationPayload,
    ) -> Result<CreatedAutomation, CollaboratorError> {
        self.policy.authorize(ctx)?;

        if let Some(message) = self.outage.read().await.clone() {
            warn!(%message, "Automation service unavailable");
            return Err(CollaboratorError::new(message));
        }

        self.check_references(payload).await?;

        let created = CreatedAutomation {
            id: Uuid::new_v4().to_string(),
            payload: payload.clone(),
            created_at: Utc::now(),
        };

        let mut automations = self.automations.write().await;
        automations.insert(created.id.clone(), created.clone());
        debug!(automation_id = %created.id, label = %payload.label, "Automation stored");

        Ok(created)
    }
}
