use crate::{DirectoryData, InMemoryBackendProvider};
use replyflow_core::{
    AutomationPayload, AutomationService, CollaboratorError, DirectoryService, RequestContext,
};

fn valid_payload() -> AutomationPayload {
    AutomationPayload {
        status: "active".to_string(),
        service_id: "2".to_string(),
        incoming: "sale".to_string(),
        platform_id: "p1".to_string(),
        page_id: "g1".to_string(),
        label: "Promo".to_string(),
        dm_content: "hello".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_directory_lookups() -> Result<(), CollaboratorError> {
    let provider = InMemoryBackendProvider::seeded();
    let (directory, _) = provider.create_services();
    let ctx = RequestContext::new();

    let kinds = directory.list_auto_reply_service_kinds(&ctx).await?;
    let ids: Vec<&str> = kinds.iter().map(|k| k.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "5"]);

    let platforms = directory.list_platforms(&ctx).await?;
    assert_eq!(platforms.len(), 1);

    let all_pages = directory.list_pages(&ctx, None).await?;
    assert_eq!(all_pages.len(), 2);
    let other_platform = directory.list_pages(&ctx, Some("p9".to_string())).await?;
    assert!(other_platform.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_posts_are_newest_first() -> Result<(), CollaboratorError> {
    let provider = InMemoryBackendProvider::seeded();
    let (directory, _) = provider.create_services();
    let ctx = RequestContext::new();

    let posts = directory.list_page_posts(&ctx, "g1").await?;
    let ids: Vec<&str> = posts.iter().map(|p| p.post_id.as_str()).collect();
    assert_eq!(ids, vec!["post-2", "post-1"]);

    assert!(directory.list_page_posts(&ctx, "g2").await?.is_empty());

    let err = directory.list_page_posts(&ctx, "nope").await.unwrap_err();
    assert_eq!(err.message, "page nope not found");
    Ok(())
}

#[tokio::test]
async fn test_create_automation_is_recorded() -> Result<(), CollaboratorError> {
    let provider = InMemoryBackendProvider::seeded();
    let (_, automations) = provider.create_services();

    let created = automations
        .create_automation(&RequestContext::new(), &valid_payload())
        .await?;
    assert_eq!(created.payload, valid_payload());

    let stored = provider.automation(&created.id).await;
    assert_eq!(stored, Some(created));
    assert_eq!(provider.automations().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_create_automation_rejects_unknown_references() {
    let provider = InMemoryBackendProvider::seeded();
    let (_, automations) = provider.create_services();
    let ctx = RequestContext::new();

    let mut payload = valid_payload();
    payload.page_id = "g9".to_string();
    let err = automations.create_automation(&ctx, &payload).await.unwrap_err();
    assert_eq!(err.message, "page g9 not found on platform p1");

    let mut payload = valid_payload();
    payload.platform_id = "p2".to_string();
    let err = automations.create_automation(&ctx, &payload).await.unwrap_err();
    assert_eq!(err.message, "platform p2 is not connected");

    assert!(provider.automations().await.is_empty());
}

#[tokio::test]
async fn test_outage_fails_until_cleared() {
    let provider = InMemoryBackendProvider::seeded();
    let (_, automations) = provider.create_services();
    let ctx = RequestContext::new();

    provider.set_outage(Some("service unavailable".to_string())).await;
    let err = automations.create_automation(&ctx, &valid_payload()).await.unwrap_err();
    assert_eq!(err.message, "service unavailable");

    provider.set_outage(None).await;
    assert!(automations.create_automation(&ctx, &valid_payload()).await.is_ok());
}

#[tokio::test]
async fn test_required_token() {
    let provider = InMemoryBackendProvider::seeded().with_required_token("secret");
    let (directory, _) = provider.create_services();

    let err = directory.list_platforms(&RequestContext::new()).await.unwrap_err();
    assert_eq!(err.message, "missing auth token");

    let err = directory
        .list_platforms(&RequestContext::new().with_auth_token("guess"))
        .await
        .unwrap_err();
    assert_eq!(err.message, "invalid auth token");

    let ok = directory
        .list_platforms(&RequestContext::new().with_auth_token("secret"))
        .await;
    assert!(ok.is_ok());
}

#[test]
fn test_directory_data_from_json() {
    let data: DirectoryData = serde_json::from_value(serde_json::json!({
        "platforms": [{"platform_id": "p1", "platform_name": "Instagram"}],
        "service_kinds": [{"id": "2", "name": "DM", "dailyLimit": 10}]
    }))
    .unwrap();
    assert_eq!(data.platforms[0].platform_name, "Instagram");
    assert_eq!(data.service_kinds[0].daily_limit, 10);
    assert!(data.pages.is_empty());
}
