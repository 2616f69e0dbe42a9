use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CategoryId, DisplayMode, DisplayPointer, Performer, PerformerId};

/// Styling the public display renders with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub bg_color: String,
    pub text_color: String,
    pub font_size: String,
    pub font_family: String,
    pub display_type: DisplayMode,
    pub display_logo_left: String,
    pub display_logo_center: String,
    pub display_logo_right: String,
}

/// Payload of the public display. Clients tell the variants apart by
/// `settings.displayType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayView {
    Performer {
        performer: Performer,
        category: Category,
        settings: DisplaySettings,
    },
    Title {
        title: String,
        subtitle: String,
        settings: DisplaySettings,
    },
}

impl DisplayView {
    pub fn settings(&self) -> &DisplaySettings {
        match self {
            DisplayView::Performer { settings, .. } | DisplayView::Title { settings, .. } => {
                settings
            }
        }
    }
}

/// The performer now on screen together with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySelection {
    pub performer: Performer,
    pub category: Category,
}

/// JSON clients send some scalar fields either as strings or as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Number(serde_json::Number),
    Text(String),
}

impl TextOrNumber {
    pub fn into_text(self) -> String {
        match self {
            TextOrNumber::Number(number) => number.to_string(),
            TextOrNumber::Text(text) => text,
        }
    }
}

impl From<&str> for TextOrNumber {
    fn from(value: &str) -> Self {
        TextOrNumber::Text(value.to_string())
    }
}

impl From<i64> for TextOrNumber {
    fn from(value: i64) -> Self {
        TextOrNumber::Number(value.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSettingRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<TextOrNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformerRequest {
    #[serde(default)]
    pub order: Option<TextOrNumber>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub category_id: Option<TextOrNumber>,
    #[serde(default)]
    pub routine: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePerformerRequest {
    #[serde(default)]
    pub performer_id: Option<TextOrNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTypeRequest {
    #[serde(default)]
    pub display_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerListQuery {
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub categories: usize,
    pub performers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    DisplayChanged {
        pointer: DisplayPointer,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        at: DateTime<Utc>,
    },
    RosterChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category_id: Option<CategoryId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        performer_id: Option<PerformerId>,
        at: DateTime<Utc>,
    },
}
