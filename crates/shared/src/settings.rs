use std::{collections::HashMap, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{CategoryId, DisplayMode, DisplayPointer, PerformerId},
    protocol::DisplaySettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    BgColor,
    TextColor,
    FontSize,
    FontFamily,
    /// Whether the display shows the competition title or a performer.
    CurrentDisplay,
    Title,
    Subtitle,
    DisplayLogoLeft,
    DisplayLogoCenter,
    DisplayLogoRight,
    CurrentCategory,
    CurrentPerformer,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown setting key '{0}'")]
pub struct UnknownSettingKey(pub String);

impl SettingKey {
    pub const ALL: [SettingKey; 12] = [
        SettingKey::BgColor,
        SettingKey::TextColor,
        SettingKey::FontSize,
        SettingKey::FontFamily,
        SettingKey::CurrentDisplay,
        SettingKey::Title,
        SettingKey::Subtitle,
        SettingKey::DisplayLogoLeft,
        SettingKey::DisplayLogoCenter,
        SettingKey::DisplayLogoRight,
        SettingKey::CurrentCategory,
        SettingKey::CurrentPerformer,
    ];

    /// Keys that make up the display pointer; a settings reset leaves them alone.
    pub const POINTER: [SettingKey; 3] = [
        SettingKey::CurrentDisplay,
        SettingKey::CurrentCategory,
        SettingKey::CurrentPerformer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::BgColor => "bg_color",
            SettingKey::TextColor => "text_color",
            SettingKey::FontSize => "font_size",
            SettingKey::FontFamily => "font_family",
            SettingKey::CurrentDisplay => "current_display",
            SettingKey::Title => "title",
            SettingKey::Subtitle => "subtitle",
            SettingKey::DisplayLogoLeft => "display_logo_left",
            SettingKey::DisplayLogoCenter => "display_logo_center",
            SettingKey::DisplayLogoRight => "display_logo_right",
            SettingKey::CurrentCategory => "current_category",
            SettingKey::CurrentPerformer => "current_performer",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            SettingKey::BgColor => "#000000",
            SettingKey::TextColor => "#FFFFFF",
            SettingKey::FontSize => "16px",
            SettingKey::FontFamily => "Arial, sans-serif",
            SettingKey::CurrentDisplay => "title",
            SettingKey::Title => "Competition Title",
            SettingKey::Subtitle => "Competition Subtitle",
            SettingKey::DisplayLogoLeft
            | SettingKey::DisplayLogoCenter
            | SettingKey::DisplayLogoRight => "",
            SettingKey::CurrentCategory | SettingKey::CurrentPerformer => "0",
        }
    }

    pub fn is_pointer(self) -> bool {
        Self::POINTER.contains(&self)
    }
}

impl FromStr for SettingKey {
    type Err = UnknownSettingKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == raw)
            .ok_or_else(|| UnknownSettingKey(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: SettingKey,
    pub value: String,
}

/// Every stored setting at one point in time, with compiled-in defaults for gaps.
#[derive(Debug, Clone, Default)]
pub struct SettingsSnapshot {
    values: HashMap<SettingKey, String>,
}

impl SettingsSnapshot {
    pub fn from_rows(rows: impl IntoIterator<Item = Setting>) -> Self {
        Self {
            values: rows.into_iter().map(|s| (s.key, s.value)).collect(),
        }
    }

    pub fn get(&self, key: SettingKey) -> &str {
        self.values
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_value())
    }

    pub fn display_pointer(&self) -> DisplayPointer {
        DisplayPointer {
            mode: DisplayMode::from_stored(self.get(SettingKey::CurrentDisplay)),
            category_id: CategoryId::from_stored(self.get(SettingKey::CurrentCategory)),
            performer_id: PerformerId::from_stored(self.get(SettingKey::CurrentPerformer)),
        }
    }

    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            bg_color: self.get(SettingKey::BgColor).to_string(),
            text_color: self.get(SettingKey::TextColor).to_string(),
            font_size: self.get(SettingKey::FontSize).to_string(),
            font_family: self.get(SettingKey::FontFamily).to_string(),
            display_type: self.display_pointer().mode,
            display_logo_left: self.get(SettingKey::DisplayLogoLeft).to_string(),
            display_logo_center: self.get(SettingKey::DisplayLogoCenter).to_string(),
            display_logo_right: self.get(SettingKey::DisplayLogoRight).to_string(),
        }
    }
}

/// Settings rows that persist a pointer.
pub fn pointer_rows(pointer: &DisplayPointer) -> [Setting; 3] {
    [
        Setting {
            key: SettingKey::CurrentDisplay,
            value: pointer.mode.as_str().to_string(),
        },
        Setting {
            key: SettingKey::CurrentCategory,
            value: pointer.category_id.to_string(),
        },
        Setting {
            key: SettingKey::CurrentPerformer,
            value: pointer.performer_id.to_string(),
        },
    ]
}
