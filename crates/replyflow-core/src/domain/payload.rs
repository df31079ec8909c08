//! Typed configuration payloads, one variant per step kind
//!
//! Older UI builds sent loosely shaped objects with alternate key spellings
//! (`serviceId`, `id`, `comment`, ...) and lists either as arrays or as
//! comma-separated strings. All of that is absorbed here during decoding so
//! the rest of the engine only sees fixed field sets.

use crate::types::{ServiceKind, StepKind};
use crate::CoreError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data produced by the service-type step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Auto-reply service id
    #[serde(
        default,
        alias = "serviceId",
        alias = "service_type",
        alias = "serviceType",
        deserialize_with = "loose_string"
    )]
    pub service_id: String,
}

impl TriggerConfig {
    /// Resolved service kind, if an id was chosen
    pub fn service_kind(&self) -> Option<ServiceKind> {
        ServiceKind::from_service_id(&self.service_id)
    }
}

/// Data produced by the platform step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Selected platform
    #[serde(default, alias = "platformId", alias = "id", deserialize_with = "loose_string")]
    pub platform_id: String,

    /// Display name of the platform
    #[serde(default, alias = "platformName", skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
}

/// Data produced by the page step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Selected page
    #[serde(default, alias = "pageId", alias = "id", deserialize_with = "loose_string")]
    pub page_id: String,

    /// Display name of the page
    #[serde(default, alias = "pageName", skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
}

/// Data produced by the post step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostConfig {
    /// Selected post
    #[serde(default, alias = "postId", alias = "id", deserialize_with = "loose_string")]
    pub post_id: String,

    /// Post text shown in the picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Data produced by the keywords step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsConfig {
    /// Trigger keywords
    #[serde(
        default,
        alias = "incoming",
        alias = "keyword_list",
        deserialize_with = "string_list"
    )]
    pub keywords: Vec<String>,
}

/// Data produced by the response step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Public comment reply
    #[serde(
        default,
        alias = "commentContent",
        alias = "comment",
        deserialize_with = "loose_string"
    )]
    pub comment_content: String,

    /// Direct message reply
    #[serde(default, alias = "dmContent", alias = "dm", deserialize_with = "loose_string")]
    pub dm_content: String,
}

/// Data produced by the final settings step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Automation label
    #[serde(default, alias = "name", deserialize_with = "loose_string")]
    pub label: String,

    /// Link titles attached to the reply
    #[serde(default, alias = "title", deserialize_with = "string_list")]
    pub titles: Vec<String>,

    /// Link urls attached to the reply
    #[serde(default, alias = "url", deserialize_with = "string_list")]
    pub urls: Vec<String>,

    /// Explicit automation status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Configuration payload of a completed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPayload {
    /// Service type selection
    Trigger(TriggerConfig),
    /// Platform selection
    Platform(PlatformConfig),
    /// Page selection
    Page(PageConfig),
    /// Post selection
    Post(PostConfig),
    /// Trigger keywords
    Keywords(KeywordsConfig),
    /// Reply content
    Response(ResponseConfig),
    /// Final settings
    Config(SettingsConfig),
}

impl StepPayload {
    /// Step this payload belongs to
    pub fn kind(&self) -> StepKind {
        match self {
            StepPayload::Trigger(_) => StepKind::Trigger,
            StepPayload::Platform(_) => StepKind::Platform,
            StepPayload::Page(_) => StepKind::Page,
            StepPayload::Post(_) => StepKind::Post,
            StepPayload::Keywords(_) => StepKind::Keywords,
            StepPayload::Response(_) => StepKind::Response,
            StepPayload::Config(_) => StepKind::Config,
        }
    }

    /// Decode raw UI data for `kind`
    pub fn from_json(kind: StepKind, data: Value) -> Result<Self, CoreError> {
        let invalid = |err: serde_json::Error| CoreError::InvalidPayload(format!("{}: {}", kind, err));
        let payload = match kind {
            StepKind::Trigger => StepPayload::Trigger(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Platform => StepPayload::Platform(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Page => StepPayload::Page(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Post => StepPayload::Post(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Keywords => StepPayload::Keywords(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Response => StepPayload::Response(serde_json::from_value(data).map_err(invalid)?),
            StepKind::Config => StepPayload::Config(serde_json::from_value(data).map_err(invalid)?),
        };
        Ok(payload)
    }

    /// Untagged JSON form of the variant's fields
    pub fn to_json(&self) -> Result<Value, CoreError> {
        let value = match self {
            StepPayload::Trigger(c) => serde_json::to_value(c)?,
            StepPayload::Platform(c) => serde_json::to_value(c)?,
            StepPayload::Page(c) => serde_json::to_value(c)?,
            StepPayload::Post(c) => serde_json::to_value(c)?,
            StepPayload::Keywords(c) => serde_json::to_value(c)?,
            StepPayload::Response(c) => serde_json::to_value(c)?,
            StepPayload::Config(c) => serde_json::to_value(c)?,
        };
        Ok(value)
    }
}

/// Merge `patch` into `base`. Objects merge key by key, anything else is replaced.
pub fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(values)) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(s) => items.push(s),
                    Value::Number(n) => items.push(n.to_string()),
                    Value::Null => {}
                    other => {
                        return Err(de::Error::custom(format!(
                            "expected a list of strings, found item {}",
                            other
                        )))
                    }
                }
            }
            items
        }
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected a list or comma-separated string, found {}",
                other
            )))
        }
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
