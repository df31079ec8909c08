use pretty_assertions::assert_eq;
use replyflow_core::{
    CoreError, FlowConfig, RequestContext, StepKind, StepOptions, StepState, SubmitOutcome,
};
use replyflow_e2e_tests::utils::{complete_canonical_flow, init_logging, instantiated_steps};
use replyflow_state_inmemory::InMemoryBackendProvider;
use replyflow_test_utils::assertions::{assert_edge_path, assert_has_failure, assert_step_state};
use replyflow_test_utils::data_generators::{applicable_steps, legacy_step_data, step_data};
use replyflow_test_utils::TestControllerBuilder;
use serde_json::json;

#[tokio::test]
async fn test_comment_and_dm_flow_end_to_end() -> anyhow::Result<()> {
    init_logging();
    let mut env = TestControllerBuilder::new().build();

    let kinds = env.controller.options_for(StepKind::Trigger).await?;
    assert_eq!(kinds.len(), 3);

    let snapshots = complete_canonical_flow(&mut env.controller, "5")?;
    let progress: Vec<u8> = snapshots.iter().map(|s| s.progress).collect();
    assert_eq!(progress, vec![14, 29, 43, 57, 71, 86, 100]);

    let last = snapshots.last().unwrap();
    assert!(last.complete);
    assert_edge_path(last, &StepKind::ALL)?;

    let outcome = env.controller.submit().await?;
    let created = match outcome {
        SubmitOutcome::Created(created) => created,
        SubmitOutcome::Rejected(report) => anyhow::bail!("unexpected rejection: {}", report),
    };
    assert_eq!(created.payload.service_id, "5");
    assert_eq!(created.payload.post_id, "post-2");
    assert_eq!(created.payload.incoming, "sale, discount");
    assert_eq!(created.payload.comment_content, "Check your inbox!");
    assert_eq!(created.payload.dm_content, "Here is your code: SALE10");
    assert_eq!(created.payload.status, "active");

    assert_eq!(env.backend.automations().await, vec![created]);
    Ok(())
}

#[tokio::test]
async fn test_dm_only_flow_skips_post_and_clears_comment() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    let snapshots = complete_canonical_flow(&mut env.controller, "2")?;
    let last = snapshots.last().unwrap();

    assert_step_state(last, StepKind::Post, StepState::Skipped)?;
    assert_eq!(last.progress, 100);
    assert_eq!(instantiated_steps(&env.controller), applicable_steps("2"));

    let (payload, report) = env.controller.assemble()?;
    assert!(report.is_valid());
    assert_eq!(payload.comment_content, "");
    assert_eq!(payload.post_id, "");
    Ok(())
}

#[tokio::test]
async fn test_strict_progress_leaves_dm_only_below_full() -> anyhow::Result<()> {
    let config = FlowConfig {
        count_skipped_steps: false,
        ..FlowConfig::default()
    };
    let mut env = TestControllerBuilder::new().with_config(config).build();
    let snapshots = complete_canonical_flow(&mut env.controller, "2")?;

    let last = snapshots.last().unwrap();
    assert!(last.complete);
    assert_eq!(last.progress, 86);
    Ok(())
}

#[tokio::test]
async fn test_switching_to_dm_only_prunes_and_rebuilds() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    env.complete(
        "1",
        &[
            StepKind::Trigger,
            StepKind::Platform,
            StepKind::Page,
            StepKind::Post,
            StepKind::Keywords,
        ],
    )?;
    let before = env.controller.progress();

    let snapshot = env.complete_with(StepKind::Trigger, json!({"service_id": "2"}))?;
    assert_eq!(
        instantiated_steps(&env.controller),
        vec![StepKind::Trigger, StepKind::Platform, StepKind::Page, StepKind::Keywords]
    );
    assert_step_state(&snapshot, StepKind::Keywords, StepState::Enabled)?;
    assert!(snapshot.progress < before);

    let store = env.controller.flow().unwrap().store();
    assert!(store.get(StepKind::Post).is_none());
    assert!(store.get(StepKind::Keywords).is_none());
    assert!(store.get(StepKind::Page).is_some());
    Ok(())
}

#[tokio::test]
async fn test_legacy_payloads_reach_the_backend_normalized() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    for step in applicable_steps("5") {
        env.complete_with(step, legacy_step_data(step, "5"))?;
    }

    let outcome = env.controller.submit().await?;
    assert!(outcome.is_created());

    let created = env.backend.automations().await;
    assert_eq!(created[0].payload.incoming, "sale, discount");
    assert_eq!(created[0].payload.title, "Shop");
    assert_eq!(created[0].payload.url, "https://bakery.example/shop");
    Ok(())
}

#[tokio::test]
async fn test_rejected_then_fixed_submission() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    env.complete("2", &[StepKind::Trigger, StepKind::Platform, StepKind::Page, StepKind::Keywords])?;
    env.complete_with(StepKind::Response, json!({"comment_content": "hi", "dm_content": ""}))?;
    env.complete_with(StepKind::Config, json!({"label": "Promo"}))?;

    match env.controller.submit().await? {
        SubmitOutcome::Rejected(report) => {
            assert_eq!(report.failures().len(), 1);
            assert_has_failure(&report, "dm_content required for dm-only service")?;
        }
        other => anyhow::bail!("expected rejection, got {:?}", other),
    }
    assert!(env.backend.automations().await.is_empty());

    env.controller
        .merge_step("response", json!({"dm_content": "hello"}))?;
    assert!(env.controller.submit().await?.is_created());
    Ok(())
}

#[tokio::test]
async fn test_backend_outage_is_retryable() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    complete_canonical_flow(&mut env.controller, "1")?;
    let snapshot = env.controller.snapshot()?;

    env.backend.set_outage(Some("upstream timeout".to_string())).await;
    let err = env.controller.submit().await.unwrap_err();
    assert_eq!(err, CoreError::SubmissionError("upstream timeout".to_string()));
    assert_eq!(env.controller.snapshot()?, snapshot);

    env.backend.set_outage(None).await;
    assert!(env.controller.submit().await?.is_created());
    Ok(())
}

#[tokio::test]
async fn test_backend_rejects_page_from_other_platform() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    complete_canonical_flow(&mut env.controller, "2")?;
    env.controller.merge_step("page", json!({"page_id": "g404"}))?;

    let err = env.controller.submit().await.unwrap_err();
    assert_eq!(
        err,
        CoreError::SubmissionError("page g404 not found on platform p1".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_auth_context_reaches_backend() -> anyhow::Result<()> {
    let backend = InMemoryBackendProvider::seeded().with_required_token("s3cret");

    let mut anonymous = TestControllerBuilder::new()
        .with_backend(InMemoryBackendProvider::seeded().with_required_token("s3cret"))
        .build();
    let err = anonymous
        .controller
        .options_for(StepKind::Platform)
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::ExternalDependencyError("missing auth token".to_string()));

    let mut env = TestControllerBuilder::new()
        .with_backend(backend)
        .with_context(RequestContext::new().with_auth_token("s3cret").with_user_id("u-1"))
        .build();
    assert!(matches!(
        env.controller.options_for(StepKind::Platform).await?,
        StepOptions::Platforms(platforms) if platforms.len() == 1
    ));

    complete_canonical_flow(&mut env.controller, "2")?;
    assert!(env.controller.submit().await?.is_created());
    Ok(())
}

#[tokio::test]
async fn test_cascade_delete_and_restart() -> anyhow::Result<()> {
    let mut env = TestControllerBuilder::new().build();
    env.complete(
        "2",
        &[
            StepKind::Trigger,
            StepKind::Platform,
            StepKind::Page,
            StepKind::Keywords,
            StepKind::Response,
        ],
    )?;

    let snapshot = env.controller.delete_step(StepKind::Keywords)?;
    assert_eq!(snapshot.progress, 43);
    assert_eq!(snapshot.current_step, Some(StepKind::Page));
    assert_edge_path(&snapshot, &[StepKind::Trigger, StepKind::Platform, StepKind::Page])?;

    let old_id = snapshot.flow_instance_id.clone();
    let restarted = env.controller.delete_step(StepKind::Trigger)?;
    assert_ne!(restarted.flow_instance_id, old_id);
    assert_eq!(restarted.progress, 0);
    assert_eq!(instantiated_steps(&env.controller), vec![StepKind::Trigger]);

    let err = env
        .controller
        .complete_step_json("platform", step_data(StepKind::Platform, "2"))
        .unwrap_err();
    assert!(err.is_topology_error());
    Ok(())
}
