use replyflow_core::{ServiceKind, StepConfigStore, StepKind, StepPayload};
use serde_json::{json, Value};

/// Canonical raw data for `step`, valid for the directory seeded by the in-memory backend
pub fn step_data(step: StepKind, service_id: &str) -> Value {
    match step {
        StepKind::Trigger => json!({ "service_id": service_id }),
        StepKind::Platform => json!({ "platform_id": "p1", "platform_name": "Facebook" }),
        StepKind::Page => json!({ "page_id": "g1", "page_name": "Corner Bakery" }),
        StepKind::Post => json!({ "post_id": "post-2" }),
        StepKind::Keywords => json!({ "keywords": ["sale", "discount"] }),
        StepKind::Response => json!({
            "comment_content": "Check your inbox!",
            "dm_content": "Here is your code: SALE10"
        }),
        StepKind::Config => json!({
            "label": "Weekend sale",
            "titles": ["Shop"],
            "urls": ["https://bakery.example/shop"]
        }),
    }
}

/// Same data as [`step_data`] in the alternate spellings older clients send
pub fn legacy_step_data(step: StepKind, service_id: &str) -> Value {
    match step {
        StepKind::Trigger => json!({ "serviceType": service_id }),
        StepKind::Platform => json!({ "id": "p1", "platformName": "Facebook" }),
        StepKind::Page => json!({ "pageId": "g1" }),
        StepKind::Post => json!({ "postId": "post-2" }),
        StepKind::Keywords => json!({ "incoming": "sale, discount" }),
        StepKind::Response => json!({
            "commentContent": "Check your inbox!",
            "dm": "Here is your code: SALE10"
        }),
        StepKind::Config => json!({
            "name": "Weekend sale",
            "title": "Shop",
            "url": "https://bakery.example/shop"
        }),
    }
}

/// Steps a flow for `service_id` visits, in order
pub fn applicable_steps(service_id: &str) -> Vec<StepKind> {
    let comment_capable = ServiceKind::from_service_id(service_id)
        .map_or(false, |kind| kind.is_comment_capable());

    StepKind::ALL
        .into_iter()
        .filter(|step| *step != StepKind::Post || comment_capable)
        .collect()
}

/// Step completions that take a flow for `service_id` to completion
pub fn canonical_script(service_id: &str) -> Vec<(StepKind, Value)> {
    applicable_steps(service_id)
        .into_iter()
        .map(|step| (step, step_data(step, service_id)))
        .collect()
}

/// A store holding every applicable step for `service_id`
pub fn completed_store(service_id: &str) -> StepConfigStore {
    let mut store = StepConfigStore::new();
    for (index, (step, data)) in canonical_script(service_id).into_iter().enumerate() {
        if let Ok(payload) = StepPayload::from_json(step, data) {
            store.put(index, payload);
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dm_only_script_skips_post() {
        let steps = applicable_steps("2");
        assert_eq!(steps.len(), 6);
        assert!(!steps.contains(&StepKind::Post));
        assert_eq!(applicable_steps("5").len(), 7);
    }

    #[test]
    fn test_legacy_and_canonical_data_decode_alike() {
        for step in StepKind::ALL {
            let canonical = StepPayload::from_json(step, step_data(step, "5")).unwrap();
            let legacy = StepPayload::from_json(step, legacy_step_data(step, "5")).unwrap();
            match step {
                StepKind::Page => {
                    assert_eq!(legacy.to_json().unwrap()["page_id"], "g1");
                }
                _ => assert_eq!(canonical, legacy, "step {}", step),
            }
        }
    }

    #[test]
    fn test_completed_store_has_every_applicable_step() {
        let store = completed_store("1");
        assert_eq!(store.len(), 7);
        assert_eq!(store.step_index_of(StepKind::Config), Some(6));
    }
}
