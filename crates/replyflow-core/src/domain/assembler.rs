//! Folding of a flow's step data into the automation submitted to the backend

use crate::domain::store::StoreSnapshot;
use crate::types::ServiceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when list fields are flattened into a single string
pub const LIST_SEPARATOR: &str = ", ";

/// Status written when the final settings step does not name one
pub const DEFAULT_STATUS: &str = "active";

/// Flattened automation rule, the only persisted artefact of a flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationPayload {
    /// Automation status
    pub status: String,
    /// Auto-reply service id
    pub service_id: String,
    /// Trigger keywords, comma-joined
    pub incoming: String,
    /// Platform the automation runs on
    pub platform_id: String,
    /// Page the automation runs on
    pub page_id: String,
    /// Post whose comments trigger the automation
    pub post_id: String,
    /// Automation label
    pub label: String,
    /// Public comment reply
    pub comment_content: String,
    /// Direct message reply
    pub dm_content: String,
    /// Link titles, comma-joined
    pub title: String,
    /// Link urls, comma-joined
    pub url: String,
}

/// One unmet requirement of an assembled payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Payload field the failure is keyed to
    pub field: &'static str,

    /// Message suitable for display
    pub message: String,
}

impl ValidationFailure {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every failure found while validating a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// True when there are no failures
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in the order they were found
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Failure messages in the order they were found
    pub fn messages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.message.as_str()).collect()
    }

    /// Whether any failure is keyed to `field`
    pub fn has_failure_for(&self, field: &str) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }

    fn require(&mut self, value: &str, field: &'static str, message: impl Into<String>) {
        if value.trim().is_empty() {
            self.failures.push(ValidationFailure::new(field, message));
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Builds an [`AutomationPayload`] and its [`ValidationReport`] from step data
///
/// `build` is a pure function of the store snapshot: it never fails and holds
/// no state between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadAssembler {
    default_status: String,
}

impl Default for PayloadAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS)
    }
}

impl PayloadAssembler {
    /// Create an assembler writing `default_status` when none is configured
    pub fn new(default_status: impl Into<String>) -> Self {
        Self {
            default_status: default_status.into(),
        }
    }

    /// Assemble and validate
    pub fn build(&self, store: StoreSnapshot<'_>) -> (AutomationPayload, ValidationReport) {
        let mut payload = self.collect(store);
        let service_kind = ServiceKind::from_service_id(&payload.service_id);

        apply_service_clearing(&mut payload, service_kind.as_ref());
        let report = validate(&payload, service_kind.as_ref());
        (payload, report)
    }

    fn collect(&self, store: StoreSnapshot<'_>) -> AutomationPayload {
        let mut payload = AutomationPayload {
            status: self.default_status.clone(),
            ..Default::default()
        };

        if let Some(trigger) = store.trigger() {
            payload.service_id = trigger.service_id.trim().to_string();
        }
        if let Some(platform) = store.platform() {
            payload.platform_id = platform.platform_id.clone();
        }
        if let Some(page) = store.page() {
            payload.page_id = page.page_id.clone();
        }
        if let Some(post) = store.post() {
            payload.post_id = post.post_id.clone();
        }
        if let Some(keywords) = store.keywords() {
            payload.incoming = keywords.keywords.join(LIST_SEPARATOR);
        }
        if let Some(response) = store.response() {
            payload.comment_content = response.comment_content.clone();
            payload.dm_content = response.dm_content.clone();
        }
        if let Some(settings) = store.settings() {
            payload.label = settings.label.clone();
            payload.title = settings.titles.join(LIST_SEPARATOR);
            payload.url = settings.urls.join(LIST_SEPARATOR);
            if let Some(status) = settings.status.as_deref().filter(|s| !s.trim().is_empty()) {
                payload.status = status.to_string();
            }
        }

        payload
    }
}

fn apply_service_clearing(payload: &mut AutomationPayload, service_kind: Option<&ServiceKind>) {
    match service_kind {
        Some(ServiceKind::CommentOnly) => payload.dm_content.clear(),
        Some(ServiceKind::DmOnly) => {
            payload.comment_content.clear();
            payload.post_id.clear();
        }
        Some(ServiceKind::CommentAndDm) | Some(ServiceKind::Unsupported(_)) | None => {}
    }
}

fn validate(payload: &AutomationPayload, service_kind: Option<&ServiceKind>) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.require(&payload.incoming, "incoming", "incoming keywords required");
    report.require(&payload.label, "label", "label required");
    report.require(&payload.platform_id, "platform_id", "platform_id required");
    report.require(&payload.page_id, "page_id", "page_id required");
    report.require(&payload.service_id, "service_id", "service_id required");

    match service_kind {
        Some(ServiceKind::CommentOnly) => report.require(
            &payload.comment_content,
            "comment_content",
            "comment_content required for comment-only service",
        ),
        Some(ServiceKind::DmOnly) => report.require(
            &payload.dm_content,
            "dm_content",
            "dm_content required for dm-only service",
        ),
        Some(ServiceKind::CommentAndDm) => {
            if payload.comment_content.trim().is_empty() && payload.dm_content.trim().is_empty() {
                report.failures.push(ValidationFailure::new(
                    "comment_content",
                    "comment_content or dm_content required for comment+dm service",
                ));
            }
        }
        Some(ServiceKind::Unsupported(id)) => report.failures.push(ValidationFailure::new(
            "service_id",
            format!("service_id {} not a supported auto-reply service", id),
        )),
        None => {}
    }

    report
}
