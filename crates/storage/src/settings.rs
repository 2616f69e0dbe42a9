use shared::{
    domain::{DisplayMode, DisplayPointer},
    settings::{pointer_rows, Setting, SettingKey, SettingsSnapshot},
};
use sqlx::{Row, SqliteConnection};

use crate::{Storage, StoreError, StoreResult};

pub(crate) async fn load_all(conn: &mut SqliteConnection) -> StoreResult<Vec<Setting>> {
    let rows = sqlx::query("SELECT key, value FROM settings")
        .fetch_all(&mut *conn)
        .await?;

    // Rows written by older builds under retired keys are ignored.
    let mut settings: Vec<Setting> = rows
        .into_iter()
        .filter_map(|r| {
            let key = r.get::<String, _>(0).parse::<SettingKey>().ok()?;
            Some(Setting {
                key,
                value: r.get::<String, _>(1),
            })
        })
        .collect();
    settings.sort_by_key(|s| SettingKey::ALL.iter().position(|key| *key == s.key));
    Ok(settings)
}

async fn load_value(conn: &mut SqliteConnection, key: SettingKey) -> StoreResult<Option<String>> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|r| r.get::<String, _>(0)))
}

async fn upsert_value(conn: &mut SqliteConnection, key: SettingKey, value: &str) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key.as_str())
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_defaults(conn: &mut SqliteConnection) -> StoreResult<()> {
    for key in SettingKey::ALL {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key.as_str())
            .bind(key.default_value())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub(crate) async fn load_pointer(conn: &mut SqliteConnection) -> StoreResult<DisplayPointer> {
    Ok(SettingsSnapshot::from_rows(load_all(conn).await?).display_pointer())
}

pub(crate) async fn save_pointer(
    conn: &mut SqliteConnection,
    pointer: &DisplayPointer,
) -> StoreResult<()> {
    for row in pointer_rows(pointer) {
        upsert_value(conn, row.key, &row.value).await?;
    }
    Ok(())
}

impl Storage {
    /// Stored value for `key`, or its compiled-in default when the row is missing.
    pub async fn setting(&self, key: SettingKey) -> StoreResult<String> {
        let mut conn = self.pool.acquire().await?;
        Ok(load_value(&mut conn, key)
            .await?
            .unwrap_or_else(|| key.default_value().to_string()))
    }

    pub async fn settings(&self) -> StoreResult<Vec<Setting>> {
        let mut conn = self.pool.acquire().await?;
        load_all(&mut conn).await
    }

    pub async fn settings_snapshot(&self) -> StoreResult<SettingsSnapshot> {
        Ok(SettingsSnapshot::from_rows(self.settings().await?))
    }

    /// Overwrites a seeded setting. Keys without a row are reported as missing
    /// rather than silently created.
    pub async fn set_setting(&self, key: SettingKey, value: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(value)
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "setting '{}' not found",
                key.as_str()
            )));
        }
        Ok(())
    }

    pub async fn seed_default_settings(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        seed_defaults(&mut conn).await
    }

    /// Restores every default except the display pointer, which keeps pointing
    /// at whatever is live.
    pub async fn reset_settings(&self) -> StoreResult<()> {
        let mut tx = self.write_tx().await?;
        sqlx::query("DELETE FROM settings WHERE key NOT IN (?, ?, ?)")
            .bind(SettingKey::POINTER[0].as_str())
            .bind(SettingKey::POINTER[1].as_str())
            .bind(SettingKey::POINTER[2].as_str())
            .execute(&mut *tx)
            .await?;
        seed_defaults(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn display_pointer(&self) -> StoreResult<DisplayPointer> {
        let mut conn = self.pool.acquire().await?;
        load_pointer(&mut conn).await
    }

    pub async fn set_display_mode(&self, mode: DisplayMode) -> StoreResult<DisplayPointer> {
        let mut tx = self.write_tx().await?;
        upsert_value(&mut tx, SettingKey::CurrentDisplay, mode.as_str()).await?;
        let pointer = load_pointer(&mut tx).await?;
        tx.commit().await?;
        Ok(pointer)
    }
}
