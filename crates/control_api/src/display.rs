//! Display coordinator.
//!
//! The public display shows either the competition title or one performer.
//! Every transition runs inside a single unit of work so a failed lookup
//! leaves the pointer exactly where it was.

use shared::{
    domain::{CategoryId, DisplayMode, DisplayPointer, Performer, PerformerId},
    error::ApiError,
    protocol::{DisplaySelection, DisplayView},
    settings::SettingKey,
};
use tracing::info;

use crate::ApiContext;

pub async fn current_view(ctx: &ApiContext) -> Result<DisplayView, ApiError> {
    let snapshot = ctx.storage.settings_snapshot().await?;
    let settings = snapshot.display_settings();
    let pointer = snapshot.display_pointer();

    match pointer.mode {
        DisplayMode::Performer => {
            let performer = ctx
                .storage
                .performer(pointer.performer_id)
                .await?
                .ok_or_else(|| ApiError::not_found("performer not found"))?;
            let category = ctx
                .storage
                .category(pointer.category_id)
                .await?
                .ok_or_else(|| ApiError::not_found("category not found"))?;
            if performer.category_id != category.id {
                return Err(ApiError::not_found(
                    "current performer does not belong to the current category",
                ));
            }
            Ok(DisplayView::Performer {
                performer,
                category,
                settings,
            })
        }
        DisplayMode::Title => Ok(DisplayView::Title {
            title: snapshot.get(SettingKey::Title).to_string(),
            subtitle: snapshot.get(SettingKey::Subtitle).to_string(),
            settings,
        }),
    }
}

/// Moves to the next performer of the current category. Gaps in the ranking
/// are skipped; there is no wraparound after the last performer.
pub async fn advance(ctx: &ApiContext) -> Result<DisplaySelection, ApiError> {
    let mut uow = ctx.storage.begin().await?;
    let pointer = uow.display_pointer().await?;

    let category = uow
        .category(pointer.category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))?;
    let performers = uow.performers_in_category(category.id).await?;
    let current = performers
        .iter()
        .find(|p| p.id == pointer.performer_id)
        .ok_or_else(|| ApiError::not_found("current performer not found"))?;
    let next = next_after(&performers, current)
        .ok_or_else(|| ApiError::not_found("no next performer found"))?
        .clone();

    let pointer = pointer.selecting(category.id, next.id);
    uow.save_display_pointer(&pointer).await?;
    uow.commit().await?;

    info!(
        category_id = category.id.0,
        performer_id = next.id.0,
        order = next.order,
        "advanced to next performer"
    );
    Ok(DisplaySelection {
        performer: next,
        category,
    })
}

/// Jumps straight to a performer and keeps the category pointer in step.
pub async fn override_current_performer(
    ctx: &ApiContext,
    performer_id: PerformerId,
) -> Result<DisplaySelection, ApiError> {
    let mut uow = ctx.storage.begin().await?;
    let performer = uow
        .performer(performer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("performer not found"))?;
    let category = uow
        .category(performer.category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))?;

    let pointer = uow.display_pointer().await?;
    uow.save_display_pointer(&pointer.selecting(category.id, performer.id))
        .await?;
    uow.commit().await?;

    info!(
        category_id = category.id.0,
        performer_id = performer.id.0,
        "current performer overridden"
    );
    Ok(DisplaySelection {
        performer,
        category,
    })
}

/// Switches category and rewinds to its lowest-ranked performer.
pub async fn set_category(
    ctx: &ApiContext,
    category_id: CategoryId,
) -> Result<DisplaySelection, ApiError> {
    let mut uow = ctx.storage.begin().await?;
    let category = uow
        .category(category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))?;
    let performers = uow.performers_in_category(category.id).await?;
    let first = first_in_order(&performers)
        .ok_or_else(|| ApiError::not_found("no performers found in this category"))?
        .clone();

    let pointer = uow.display_pointer().await?;
    uow.save_display_pointer(&pointer.selecting(category.id, first.id))
        .await?;
    uow.commit().await?;

    info!(
        category_id = category.id.0,
        performer_id = first.id.0,
        "category selected"
    );
    Ok(DisplaySelection {
        performer: first,
        category,
    })
}

pub async fn switch_display_type(
    ctx: &ApiContext,
    display_type: &str,
) -> Result<DisplayPointer, ApiError> {
    let mode = DisplayMode::parse(display_type).ok_or_else(|| {
        ApiError::validation(format!(
            "invalid display type '{display_type}', expected 'performer' or 'title'"
        ))
    })?;
    let pointer = ctx.storage.set_display_mode(mode).await?;
    info!(mode = mode.as_str(), "display type switched");
    Ok(pointer)
}

fn first_in_order(performers: &[Performer]) -> Option<&Performer> {
    performers.iter().min_by_key(|p| (p.order, p.id.0))
}

fn next_after<'a>(performers: &'a [Performer], current: &Performer) -> Option<&'a Performer> {
    performers
        .iter()
        .filter(|p| p.order > current.order)
        .min_by_key(|p| (p.order, p.id.0))
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
