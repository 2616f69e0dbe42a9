use shared::{error::ApiError, protocol::TextOrNumber};
use storage::Storage;

mod admin;
mod display;
mod roster;

pub use admin::{
    create_category, create_performer, delete_category, delete_performer, get_category,
    get_performer, list_categories, list_performers, list_settings, rename_category,
    reset_settings, update_performer, update_setting,
};
pub use display::{
    advance, current_view, override_current_performer, set_category, switch_display_type,
};
pub use roster::{export_roster_csv, import_roster_csv};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

/// Reads an integer that clients may send either as a JSON number or a string.
pub fn required_integer(value: Option<TextOrNumber>, field: &str) -> Result<i64, ApiError> {
    let raw = value
        .map(TextOrNumber::into_text)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("{field} must be an integer, got '{raw}'")))
}
