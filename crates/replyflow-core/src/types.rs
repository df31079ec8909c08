use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Service id of the comment-only auto-reply kind
pub const COMMENT_ONLY_SERVICE_ID: &str = "1";

/// Service id of the DM-only auto-reply kind
pub const DM_ONLY_SERVICE_ID: &str = "2";

/// Service id of the comment-and-DM auto-reply kind
pub const COMMENT_AND_DM_SERVICE_ID: &str = "5";

/// Kind of a step in the automation configuration wizard
///
/// Variants are declared in canonical order. Each kind appears at most once
/// per flow instance, so the kind doubles as the step id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Service type selection
    Trigger,
    /// Social platform selection
    Platform,
    /// Page selection
    Page,
    /// Post selection (comment-capable services only)
    Post,
    /// Trigger keywords
    Keywords,
    /// Comment and DM reply content
    Response,
    /// Final settings: label, titles, urls
    Config,
}

impl StepKind {
    /// Every step kind in canonical order
    pub const ALL: [StepKind; 7] = [
        StepKind::Trigger,
        StepKind::Platform,
        StepKind::Page,
        StepKind::Post,
        StepKind::Keywords,
        StepKind::Response,
        StepKind::Config,
    ];

    /// Stable string id used at the UI boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Trigger => "trigger",
            StepKind::Platform => "platform",
            StepKind::Page => "page",
            StepKind::Post => "post",
            StepKind::Keywords => "keywords",
            StepKind::Response => "response",
            StepKind::Config => "config",
        }
    }

    /// Rank in the canonical sequence
    pub fn order(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStep(s.to_string()))
    }
}

/// Response mode of an automation, derived from its service id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Replies with a public comment only
    CommentOnly,
    /// Replies with a direct message only
    DmOnly,
    /// Replies with a comment and/or a direct message
    CommentAndDm,
    /// Any other service id
    Unsupported(String),
}

impl ServiceKind {
    /// Resolve a service id. Blank ids resolve to `None`.
    pub fn from_service_id(service_id: &str) -> Option<Self> {
        let id = service_id.trim();
        match id {
            "" => None,
            COMMENT_ONLY_SERVICE_ID => Some(ServiceKind::CommentOnly),
            DM_ONLY_SERVICE_ID => Some(ServiceKind::DmOnly),
            COMMENT_AND_DM_SERVICE_ID => Some(ServiceKind::CommentAndDm),
            other => Some(ServiceKind::Unsupported(other.to_string())),
        }
    }

    /// The service id this kind is keyed by
    pub fn service_id(&self) -> &str {
        match self {
            ServiceKind::CommentOnly => COMMENT_ONLY_SERVICE_ID,
            ServiceKind::DmOnly => DM_ONLY_SERVICE_ID,
            ServiceKind::CommentAndDm => COMMENT_AND_DM_SERVICE_ID,
            ServiceKind::Unsupported(id) => id,
        }
    }

    /// Whether automations of this kind act on a specific post's comments
    pub fn is_comment_capable(&self) -> bool {
        matches!(self, ServiceKind::CommentOnly | ServiceKind::CommentAndDm)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::CommentOnly => f.write_str("comment-only"),
            ServiceKind::DmOnly => f.write_str("dm-only"),
            ServiceKind::CommentAndDm => f.write_str("comment+dm"),
            ServiceKind::Unsupported(id) => write!(f, "unsupported({})", id),
        }
    }
}

/// Caller identity forwarded to collaborator services
///
/// Collaborators never read credentials from process-wide state; the owner of
/// a flow controller hands this in explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Bearer token for the remote API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Id of the user editing the flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl RequestContext {
    /// Create an anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an auth token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Attach a user id
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_kind_round_trips_through_str() {
        for kind in StepKind::ALL {
            assert_eq!(kind.as_str().parse::<StepKind>().unwrap(), kind);
        }
        assert_eq!(
            "settings".parse::<StepKind>(),
            Err(CoreError::UnknownStep("settings".to_string()))
        );
    }

    #[test]
    fn test_step_kind_order_is_canonical() {
        let orders: Vec<usize> = StepKind::ALL.iter().map(|k| k.order()).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(StepKind::Page < StepKind::Post);
    }

    #[test]
    fn test_service_kind_resolution() {
        assert_eq!(ServiceKind::from_service_id("1"), Some(ServiceKind::CommentOnly));
        assert_eq!(ServiceKind::from_service_id(" 2 "), Some(ServiceKind::DmOnly));
        assert_eq!(ServiceKind::from_service_id("5"), Some(ServiceKind::CommentAndDm));
        assert_eq!(
            ServiceKind::from_service_id("9"),
            Some(ServiceKind::Unsupported("9".to_string()))
        );
        assert_eq!(ServiceKind::from_service_id("  "), None);
    }

    #[test]
    fn test_comment_capability() {
        assert!(ServiceKind::CommentOnly.is_comment_capable());
        assert!(ServiceKind::CommentAndDm.is_comment_capable());
        assert!(!ServiceKind::DmOnly.is_comment_capable());
        assert!(!ServiceKind::Unsupported("7".to_string()).is_comment_capable());
    }

    #[test]
    fn test_request_context_builder() {
        let ctx = RequestContext::new().with_auth_token("t0k").with_user_id("u-1");
        assert_eq!(ctx.auth_token.as_deref(), Some("t0k"));
        assert_eq!(ctx.user_id.as_deref(), Some("u-1"));
    }
}
