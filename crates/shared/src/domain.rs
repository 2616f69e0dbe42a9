use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            /// Sentinel stored in the display pointer when nothing is selected.
            pub const UNSET: Self = Self(0);

            pub fn is_set(self) -> bool {
                self.0 != 0
            }

            /// Parses a stored pointer value, treating anything unreadable as unset.
            pub fn from_stored(raw: &str) -> Self {
                Self(raw.trim().parse().unwrap_or(0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CategoryId);
id_newtype!(PerformerId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performer {
    pub id: PerformerId,
    #[serde(with = "string_rank")]
    pub order: i64,
    pub name: String,
    pub club: String,
    pub category_id: CategoryId,
    pub routine: String,
}

/// Field values for inserting or updating a performer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformerDraft {
    pub order: i64,
    pub name: String,
    pub club: String,
    pub category_id: CategoryId,
    pub routine: String,
}

/// One line of a roster import or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub name: String,
    pub club: String,
    pub category_name: String,
    pub routine: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Title,
    Performer,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Title => "title",
            DisplayMode::Performer => "performer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "title" => Some(DisplayMode::Title),
            "performer" => Some(DisplayMode::Performer),
            _ => None,
        }
    }

    /// Stored values that are not recognised fall back to the title screen.
    pub fn from_stored(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

/// What the public display currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayPointer {
    pub mode: DisplayMode,
    pub category_id: CategoryId,
    pub performer_id: PerformerId,
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::UNSET
    }
}

impl Default for PerformerId {
    fn default() -> Self {
        Self::UNSET
    }
}

impl DisplayPointer {
    /// Title mode with nothing selected, as left behind by a roster import.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn selecting(self, category_id: CategoryId, performer_id: PerformerId) -> Self {
        Self {
            category_id,
            performer_id,
            ..self
        }
    }
}

/// Performer ranks travel as strings on the wire but are integers everywhere else.
pub mod string_rank {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rank: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(rank)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
        }
    }
}
