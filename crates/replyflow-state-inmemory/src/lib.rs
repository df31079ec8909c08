//! In-memory collaborator services for replyflow
//!
//! This crate provides in-memory implementations of the directory and
//! automation services consumed by replyflow-core. It is primarily useful for
//! development, testing, and the command line replay tool where no remote
//! API is available.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod repositories;
pub use repositories::{AccessPolicy, InMemoryAutomationService, InMemoryDirectoryService};

use replyflow_core::{
    AutomationService, CreatedAutomation, DirectoryService, PagePost, PageSummary, PlatformSummary,
    ServiceKindSummary,
};

/// Directory contents served by [`InMemoryDirectoryService`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryData {
    /// Connected platforms
    #[serde(default)]
    pub platforms: Vec<PlatformSummary>,

    /// Pages across all platforms
    #[serde(default)]
    pub pages: Vec<PageSummary>,

    /// Auto-reply service kinds
    #[serde(default)]
    pub service_kinds: Vec<ServiceKindSummary>,

    /// Posts keyed by page id
    #[serde(default)]
    pub posts: HashMap<String, Vec<PagePost>>,
}

impl DirectoryData {
    /// A small directory with one platform, two pages and the three service kinds
    pub fn seeded() -> Self {
        let service_kinds = vec![
            ServiceKindSummary {
                id: "1".to_string(),
                name: "Comment reply".to_string(),
                daily_limit: 500,
            },
            ServiceKindSummary {
                id: "2".to_string(),
                name: "Direct message".to_string(),
                daily_limit: 200,
            },
            ServiceKindSummary {
                id: "5".to_string(),
                name: "Comment and direct message".to_string(),
                daily_limit: 200,
            },
        ];

        let platforms = vec![PlatformSummary {
            platform_id: "p1".to_string(),
            platform_name: "Facebook".to_string(),
        }];

        let pages = vec![
            PageSummary {
                page_id: "g1".to_string(),
                page_name: "Corner Bakery".to_string(),
                platform_id: "p1".to_string(),
            },
            PageSummary {
                page_id: "g2".to_string(),
                page_name: "Corner Bakery Events".to_string(),
                platform_id: "p1".to_string(),
            },
        ];

        let post = |post_id: &str, text: &str, day: u32| PagePost {
            post_id: post_id.to_string(),
            text: text.to_string(),
            created_time: Utc
                .with_ymd_and_hms(2024, 3, day, 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        };
        let mut posts = HashMap::new();
        posts.insert(
            "g1".to_string(),
            vec![
                post("post-1", "Fresh sourdough every morning", 1),
                post("post-2", "Weekend sale: comment SALE for a code", 8),
            ],
        );

        Self {
            platforms,
            pages,
            service_kinds,
            posts,
        }
    }
}

/// Provider for in-memory collaborator services
///
/// Services created by one provider share its directory and automation maps.
pub struct InMemoryBackendProvider {
    directory: Arc<RwLock<DirectoryData>>,
    automations: Arc<RwLock<HashMap<String, CreatedAutomation>>>,
    outage: Arc<RwLock<Option<String>>>,
    policy: AccessPolicy,
}

impl InMemoryBackendProvider {
    /// Create a provider serving `directory`
    pub fn new(directory: DirectoryData) -> Self {
        debug!(
            platforms = directory.platforms.len(),
            pages = directory.pages.len(),
            "Creating in-memory backend"
        );
        Self {
            directory: Arc::new(RwLock::new(directory)),
            automations: Arc::new(RwLock::new(HashMap::new())),
            outage: Arc::new(RwLock::new(None)),
            policy: AccessPolicy::open(),
        }
    }

    /// Create a provider serving [`DirectoryData::seeded`]
    pub fn seeded() -> Self {
        Self::new(DirectoryData::seeded())
    }

    /// Require `token` on every call made through services created afterwards
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.policy = AccessPolicy::with_required_token(token);
        self
    }

    /// Create the services for use with a FlowController
    pub fn create_services(&self) -> (Arc<dyn DirectoryService>, Arc<dyn AutomationService>) {
        let directory = Arc::new(InMemoryDirectoryService::new(
            self.directory.clone(),
            self.policy.clone(),
        ));
        let automations = Arc::new(InMemoryAutomationService::new(
            self.directory.clone(),
            self.automations.clone(),
            self.outage.clone(),
            self.policy.clone(),
        ));
        (directory, automations)
    }

    /// Make automation creation fail with `message` until cleared with `None`
    pub async fn set_outage(&self, message: Option<String>) {
        if let Some(message) = &message {
            info!(%message, "Simulating automation service outage");
        }
        *self.outage.write().await = message;
    }

    /// Every automation created so far, oldest first
    pub async fn automations(&self) -> Vec<CreatedAutomation> {
        let automations = self.automations.read().await;
        let mut all: Vec<CreatedAutomation> = automations.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    /// Look up a created automation
    pub async fn automation(&self, id: &str) -> Option<CreatedAutomation> {
        self.automations.read().await.get(id).cloned()
    }
}

impl Default for InMemoryBackendProvider {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests;
