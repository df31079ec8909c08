//! Mocks of the DirectoryService and AutomationService traits.

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use replyflow_core::{
    AutomationPayload, AutomationService, CollaboratorError, CreatedAutomation, DirectoryService,
    PagePost, PageSummary, PlatformSummary, RequestContext, ServiceKindSummary,
};

// Generate the mock implementations
mock! {
    pub DirectoryService {}

    #[async_trait]
    impl DirectoryService for DirectoryService {
        async fn list_platforms(&self, ctx: &RequestContext) -> Result<Vec<PlatformSummary>, CollaboratorError>;
        async fn list_pages(&self, ctx: &RequestContext, platform_id: Option<String>) -> Result<Vec<PageSummary>, CollaboratorError>;
        async fn list_auto_reply_service_kinds(&self, ctx: &RequestContext) -> Result<Vec<ServiceKindSummary>, CollaboratorError>;
        async fn list_page_posts(&self, ctx: &RequestContext, page_id: &str) -> Result<Vec<PagePost>, CollaboratorError>;
    }
}

mock! {
    pub AutomationService {}

    #[async_trait]
    impl AutomationService for AutomationService {
        async fn create_automation(&self, ctx: &RequestContext, payload: &AutomationPayload) -> Result<CreatedAutomation, CollaboratorError>;
    }
}

/// A directory mock that must never be called
pub fn create_unused_directory() -> MockDirectoryService {
    let mut mock = MockDirectoryService::new();
    mock.expect_list_platforms().never();
    mock.expect_list_pages().never();
    mock.expect_list_auto_reply_service_kinds().never();
    mock.expect_list_page_posts().never();
    mock
}

/// An automation mock that must never be called
pub fn create_unused_automation_service() -> MockAutomationService {
    let mut mock = MockAutomationService::new();
    mock.expect_create_automation().never();
    mock
}

/// An automation mock that accepts exactly `times` payloads, echoing each back
pub fn create_accepting_automation_service(times: usize) -> MockAutomationService {
    let mut mock = MockAutomationService::new();
    mock.expect_create_automation()
        .times(times)
        .returning(|_, payload| {
            Ok(CreatedAutomation {
                id: uuid::Uuid::new_v4().to_string(),
                payload: payload.clone(),
                created_at: Utc::now(),
            })
        });
    mock
}

/// An automation mock that fails every call with `message`
pub fn create_failing_automation_service(message: &str) -> MockAutomationService {
    let message = message.to_string();
    let mut mock = MockAutomationService::new();
    mock.expect_create_automation()
        .returning(move |_, _| Err(CollaboratorError::new(message.clone())));
    mock
}
