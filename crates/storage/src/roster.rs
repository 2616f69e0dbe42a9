use std::collections::HashMap;

use shared::{
    domain::{DisplayPointer, PerformerDraft, RosterRow},
    protocol::ImportSummary,
};
use sqlx::Row;
use tracing::info;

use crate::{categories, performers, settings, Storage, StoreError, StoreResult};

impl Storage {
    /// Replaces the whole roster. Existing performers and categories are
    /// dropped, the display returns to the title screen, and categories are
    /// recreated in the order their names first appear. Ranks run 1..N per
    /// category in input order. Nothing changes unless every row lands.
    pub async fn import_roster(&self, rows: &[RosterRow]) -> StoreResult<ImportSummary> {
        if rows.is_empty() {
            return Err(StoreError::Validation(
                "roster import contains no performers".into(),
            ));
        }

        let mut tx = self.write_tx().await?;
        sqlx::query("DELETE FROM performers").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
        settings::save_pointer(&mut tx, &DisplayPointer::cleared()).await?;

        let mut category_ids = HashMap::new();
        for row in rows {
            if !category_ids.contains_key(row.category_name.as_str()) {
                let category = categories::insert(&mut tx, &row.category_name).await?;
                category_ids.insert(row.category_name.as_str(), category.id);
            }
        }

        for row in rows {
            let category_id = category_ids[row.category_name.as_str()];
            let order = performers::next_rank(&mut tx, category_id).await?;
            performers::insert(
                &mut tx,
                &PerformerDraft {
                    order,
                    name: row.name.clone(),
                    club: row.club.clone(),
                    category_id,
                    routine: row.routine.clone(),
                },
            )
            .await?;
        }

        tx.commit().await?;
        let summary = ImportSummary {
            categories: category_ids.len(),
            performers: rows.len(),
        };
        info!(
            categories = summary.categories,
            performers = summary.performers,
            "roster imported"
        );
        Ok(summary)
    }

    pub async fn export_roster(&self) -> StoreResult<Vec<RosterRow>> {
        let rows = sqlx::query(
            "SELECT p.name, p.club, c.name, p.routine
             FROM performers p
             INNER JOIN categories c ON c.id = p.category_id
             ORDER BY c.id ASC, p.running_order ASC, p.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| RosterRow {
                name: r.get::<String, _>(0),
                club: r.get::<String, _>(1),
                category_name: r.get::<String, _>(2),
                routine: r.get::<String, _>(3),
            })
            .collect())
    }
}
