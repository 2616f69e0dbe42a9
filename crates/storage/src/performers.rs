use shared::domain::{CategoryId, Performer, PerformerDraft, PerformerId};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::{categories, settings, Storage, StoreError, StoreResult};

fn performer_from_row(r: &SqliteRow) -> Performer {
    Performer {
        id: PerformerId(r.get::<i64, _>(0)),
        order: r.get::<i64, _>(1),
        name: r.get::<String, _>(2),
        club: r.get::<String, _>(3),
        category_id: CategoryId(r.get::<i64, _>(4)),
        routine: r.get::<String, _>(5),
    }
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: PerformerId,
) -> StoreResult<Option<Performer>> {
    let row = sqlx::query(
        "SELECT id, running_order, name, club, category_id, routine
         FROM performers
         WHERE id = ?",
    )
    .bind(id.0)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.as_ref().map(performer_from_row))
}

pub(crate) async fn fetch_by_category(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> StoreResult<Vec<Performer>> {
    let rows = sqlx::query(
        "SELECT id, running_order, name, club, category_id, routine
         FROM performers
         WHERE category_id = ?
         ORDER BY running_order ASC, id ASC",
    )
    .bind(category_id.0)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().map(performer_from_row).collect())
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    draft: &PerformerDraft,
) -> StoreResult<Performer> {
    let rec = sqlx::query(
        "INSERT INTO performers (running_order, name, club, category_id, routine)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(draft.order)
    .bind(&draft.name)
    .bind(&draft.club)
    .bind(draft.category_id.0)
    .bind(&draft.routine)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Performer {
        id: PerformerId(rec.get::<i64, _>(0)),
        order: draft.order,
        name: draft.name.clone(),
        club: draft.club.clone(),
        category_id: draft.category_id,
        routine: draft.routine.clone(),
    })
}

/// Rank that places a new performer after everyone already in the category.
pub(crate) async fn next_rank(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> StoreResult<i64> {
    let rank: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(running_order), 0) + 1 FROM performers WHERE category_id = ?",
    )
    .bind(category_id.0)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rank)
}

async fn ensure_category_exists(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> StoreResult<()> {
    match categories::fetch(conn, category_id).await? {
        Some(_) => Ok(()),
        None => Err(StoreError::InvalidReference(category_id)),
    }
}

impl Storage {
    pub async fn list_performers(&self) -> StoreResult<Vec<Performer>> {
        let rows = sqlx::query(
            "SELECT id, running_order, name, club, category_id, routine
             FROM performers
             ORDER BY category_id ASC, running_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(performer_from_row).collect())
    }

    pub async fn performers_in_category(
        &self,
        category_id: CategoryId,
    ) -> StoreResult<Vec<Performer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_category(&mut conn, category_id).await
    }

    pub async fn performer(&self, id: PerformerId) -> StoreResult<Option<Performer>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    pub async fn create_performer(&self, draft: &PerformerDraft) -> StoreResult<Performer> {
        let mut tx = self.write_tx().await?;
        ensure_category_exists(&mut tx, draft.category_id).await?;
        let performer = insert(&mut tx, draft).await?;
        tx.commit().await?;
        Ok(performer)
    }

    /// Rewrites every field of a performer. When the performer on screen moves
    /// to another category the display pointer follows it.
    pub async fn update_performer(
        &self,
        id: PerformerId,
        draft: &PerformerDraft,
    ) -> StoreResult<Performer> {
        let mut tx = self.write_tx().await?;
        ensure_category_exists(&mut tx, draft.category_id).await?;

        let result = sqlx::query(
            "UPDATE performers
             SET running_order = ?, name = ?, club = ?, category_id = ?, routine = ?
             WHERE id = ?",
        )
        .bind(draft.order)
        .bind(&draft.name)
        .bind(&draft.club)
        .bind(draft.category_id.0)
        .bind(&draft.routine)
        .bind(id.0)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("performer {id} not found")));
        }

        let pointer = settings::load_pointer(&mut tx).await?;
        if pointer.performer_id == id && pointer.category_id != draft.category_id {
            let moved = pointer.selecting(draft.category_id, id);
            settings::save_pointer(&mut tx, &moved).await?;
        }

        tx.commit().await?;
        Ok(Performer {
            id,
            order: draft.order,
            name: draft.name.clone(),
            club: draft.club.clone(),
            category_id: draft.category_id,
            routine: draft.routine.clone(),
        })
    }

    /// Removes a performer. If it was on screen the pointer drops back to the
    /// unset sentinel until the operator picks someone else.
    pub async fn delete_performer(&self, id: PerformerId) -> StoreResult<bool> {
        let mut tx = self.write_tx().await?;
        let deleted = sqlx::query("DELETE FROM performers WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if !deleted {
            return Ok(false);
        }

        let pointer = settings::load_pointer(&mut tx).await?;
        if pointer.performer_id == id {
            let cleared = pointer.selecting(pointer.category_id, PerformerId::UNSET);
            settings::save_pointer(&mut tx, &cleared).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
