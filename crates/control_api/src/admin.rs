use shared::{
    domain::{Category, CategoryId, DisplayMode, Performer, PerformerDraft, PerformerId},
    error::ApiError,
    protocol::{CategoryRequest, PerformerRequest, SetSettingRequest},
    settings::{Setting, SettingKey},
};
use tracing::info;

use crate::{required_integer, required_text, ApiContext};

pub async fn list_settings(ctx: &ApiContext) -> Result<Vec<Setting>, ApiError> {
    Ok(ctx.storage.settings().await?)
}

/// Overwrites one setting. An empty value is allowed so logos can be cleared.
pub async fn update_setting(ctx: &ApiContext, req: SetSettingRequest) -> Result<Setting, ApiError> {
    let (Some(raw_key), Some(value)) = (req.key, req.value) else {
        return Err(ApiError::validation("key and value are required"));
    };
    let key = raw_key
        .trim()
        .parse::<SettingKey>()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let value = value.into_text();

    match key {
        SettingKey::CurrentDisplay if DisplayMode::parse(&value).is_none() => {
            return Err(ApiError::validation(format!(
                "invalid display type '{value}', expected 'performer' or 'title'"
            )));
        }
        SettingKey::CurrentCategory | SettingKey::CurrentPerformer
            if value.trim().parse::<i64>().is_err() =>
        {
            return Err(ApiError::validation(format!(
                "{} must be an integer id",
                key.as_str()
            )));
        }
        _ => {}
    }

    ctx.storage.set_setting(key, &value).await?;
    info!(key = key.as_str(), "setting updated");
    Ok(Setting { key, value })
}

pub async fn reset_settings(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.reset_settings().await?;
    info!("settings reset to defaults");
    Ok(())
}

pub async fn list_categories(ctx: &ApiContext) -> Result<Vec<Category>, ApiError> {
    Ok(ctx.storage.list_categories().await?)
}

pub async fn get_category(ctx: &ApiContext, id: CategoryId) -> Result<Category, ApiError> {
    ctx.storage
        .category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))
}

pub async fn create_category(ctx: &ApiContext, req: CategoryRequest) -> Result<Category, ApiError> {
    let name = required_text(req.name, "category name")?;
    Ok(ctx.storage.create_category(&name).await?)
}

pub async fn rename_category(
    ctx: &ApiContext,
    id: CategoryId,
    req: CategoryRequest,
) -> Result<Category, ApiError> {
    let name = required_text(req.name, "category name")?;
    ctx.storage
        .rename_category(id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))
}

pub async fn delete_category(ctx: &ApiContext, id: CategoryId) -> Result<(), ApiError> {
    if ctx.storage.delete_category(id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("category not found"))
    }
}

pub async fn list_performers(
    ctx: &ApiContext,
    category_id: Option<CategoryId>,
) -> Result<Vec<Performer>, ApiError> {
    let performers = match category_id {
        Some(category_id) => ctx.storage.performers_in_category(category_id).await?,
        None => ctx.storage.list_performers().await?,
    };
    Ok(performers)
}

pub async fn get_performer(ctx: &ApiContext, id: PerformerId) -> Result<Performer, ApiError> {
    ctx.storage
        .performer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("performer not found"))
}

pub async fn create_performer(
    ctx: &ApiContext,
    req: PerformerRequest,
) -> Result<Performer, ApiError> {
    let draft = performer_draft(req)?;
    Ok(ctx.storage.create_performer(&draft).await?)
}

pub async fn update_performer(
    ctx: &ApiContext,
    id: PerformerId,
    req: PerformerRequest,
) -> Result<Performer, ApiError> {
    let draft = performer_draft(req)?;
    Ok(ctx.storage.update_performer(id, &draft).await?)
}

pub async fn delete_performer(ctx: &ApiContext, id: PerformerId) -> Result<(), ApiError> {
    if ctx.storage.delete_performer(id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("performer not found"))
    }
}

fn performer_draft(req: PerformerRequest) -> Result<PerformerDraft, ApiError> {
    Ok(PerformerDraft {
        order: required_integer(req.order, "order")?,
        name: required_text(req.name, "name")?,
        club: required_text(req.club, "club")?,
        category_id: CategoryId(required_integer(req.category_id, "category_id")?),
        routine: req.routine.map(|r| r.trim().to_string()).unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
