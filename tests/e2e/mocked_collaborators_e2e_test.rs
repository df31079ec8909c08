use pretty_assertions::assert_eq;
use replyflow_core::{CollaboratorError, CoreError, PageSummary, StepKind, StepOptions};
use replyflow_e2e_tests::utils::complete_canonical_flow;
use replyflow_test_utils::mocks::{
    create_accepting_automation_service, create_failing_automation_service,
    create_unused_automation_service, create_unused_directory, MockDirectoryService,
};
use replyflow_test_utils::TestControllerBuilder;
use serde_json::json;

#[tokio::test]
async fn test_invalid_flow_never_reaches_collaborator() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new()
        .with_directory(create_unused_directory())
        .with_automation_service(create_unused_automation_service())
        .build();

    env.complete_with(StepKind::Trigger, json!({"service_id": "1"}))?;
    env.complete_with(StepKind::Platform, json!({"platform_id": "p1"}))?;

    let outcome = env.controller.submit().await?;
    assert!(!outcome.is_created());

    let (_, report) = env.controller.assemble()?;
    assert!(report.has_failure_for("incoming"));
    assert!(report.has_failure_for("label"));
    assert!(report.has_failure_for("page_id"));
    Ok(())
}

#[tokio::test]
async fn test_valid_flow_calls_collaborator_once() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new()
        .with_directory(create_unused_directory())
        .with_automation_service(create_accepting_automation_service(1))
        .build();

    complete_canonical_flow(&mut env.controller, "1")?;
    let outcome = env.controller.submit().await?;
    assert!(outcome.is_created());

    // The in-memory backend is bypassed entirely
    assert!(env.backend.automations().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_collaborator_failure_message_is_preserved() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new()
        .with_automation_service(create_failing_automation_service("quota exceeded for page g1"))
        .build();

    complete_canonical_flow(&mut env.controller, "5")?;
    let err = env.controller.submit().await.unwrap_err();
    assert_eq!(
        err,
        CoreError::SubmissionError("quota exceeded for page g1".to_string())
    );

    // Local state survives the failure
    assert_eq!(env.controller.progress(), 100);
    assert!(env.controller.snapshot()?.complete);
    Ok(())
}

#[tokio::test]
async fn test_page_options_are_scoped_to_selected_platform() -> anyhow::Result<()> {
    let mut directory = MockDirectoryService::new();
    directory
        .expect_list_pages()
        .withf(|_, platform_id| platform_id.as_deref() == Some("p7"))
        .times(1)
        .returning(|_, _| {
            Ok(vec![PageSummary {
                page_id: "g7".to_string(),
                page_name: "Harbor Cafe".to_string(),
                platform_id: "p7".to_string(),
            }])
        });

    let mut env = TestControllerBuilder::new()
        .with_directory(directory)
        .with_automation_service(create_unused_automation_service())
        .build();

    // No platform chosen yet: nothing to list and no collaborator call
    assert!(env.controller.options_for(StepKind::Page).await?.is_empty());

    env.complete_with(StepKind::Trigger, json!({"service_id": "2"}))?;
    env.complete_with(StepKind::Platform, json!({"platform_id": "p7"}))?;

    match env.controller.options_for(StepKind::Page).await? {
        StepOptions::Pages(pages) => assert_eq!(pages[0].page_id, "g7"),
        other => anyhow::bail!("expected pages, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_directory_failure_becomes_external_dependency_error() -> anyhow::Result<()> {
    let mut directory = MockDirectoryService::new();
    directory
        .expect_list_auto_reply_service_kinds()
        .returning(|_| Err(CollaboratorError::new("directory unavailable")));

    let env = TestControllerBuilder::new().with_directory(directory).build();

    let err = env.controller.options_for(StepKind::Trigger).await.unwrap_err();
    assert_eq!(
        err,
        CoreError::ExternalDependencyError("directory unavailable".to_string())
    );
    assert!(!err.is_topology_error());
    Ok(())
}
