use shared::{
    error::ApiError,
    protocol::ImportSummary,
    roster_csv::{parse_roster, write_roster},
};

use crate::ApiContext;

/// Replaces the roster with the contents of an uploaded CSV file.
pub async fn import_roster_csv(ctx: &ApiContext, csv: &str) -> Result<ImportSummary, ApiError> {
    let rows = parse_roster(csv).map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(ctx.storage.import_roster(&rows).await?)
}

pub async fn export_roster_csv(ctx: &ApiContext) -> Result<String, ApiError> {
    let rows = ctx.storage.export_roster().await?;
    Ok(write_roster(&rows))
}
