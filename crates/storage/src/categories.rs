use shared::domain::{Category, CategoryId, PerformerId};
use sqlx::{Row, SqliteConnection};
use tracing::info;

use crate::{settings, Storage, StoreError, StoreResult};

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    id: CategoryId,
) -> StoreResult<Option<Category>> {
    let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
        .bind(id.0)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|r| Category {
        id: CategoryId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
    }))
}

pub(crate) async fn insert(conn: &mut SqliteConnection, name: &str) -> StoreResult<Category> {
    let rec = sqlx::query("INSERT INTO categories (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| StoreError::on_write(e, || duplicate_name(name)))?;
    Ok(Category {
        id: CategoryId(rec.get::<i64, _>(0)),
        name: name.to_string(),
    })
}

fn duplicate_name(name: &str) -> String {
    format!("category '{name}' already exists")
}

impl Storage {
    pub async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
            })
            .collect())
    }

    pub async fn category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    pub async fn create_category(&self, name: &str) -> StoreResult<Category> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, name).await
    }

    pub async fn rename_category(&self, id: CategoryId, name: &str) -> StoreResult<Option<Category>> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::on_write(e, || duplicate_name(name)))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(Category {
            id,
            name: name.to_string(),
        }))
    }

    /// Deletes a category together with its performers. A display pointer into
    /// the category is cleared so it never dangles.
    pub async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let mut tx = self.write_tx().await?;

        let performers_removed = sqlx::query("DELETE FROM performers WHERE category_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if !deleted {
            return Ok(false);
        }

        let pointer = settings::load_pointer(&mut tx).await?;
        if pointer.category_id == id {
            let cleared = pointer.selecting(CategoryId::UNSET, PerformerId::UNSET);
            settings::save_pointer(&mut tx, &cleared).await?;
        }

        tx.commit().await?;
        info!(category_id = id.0, performers_removed, "category deleted");
        Ok(true)
    }
}
