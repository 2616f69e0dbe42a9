use super::*;
use shared::{
    domain::{DisplayMode, PerformerDraft, RosterRow},
    settings::SettingKey,
};

async fn memory_storage() -> Storage {
    Storage::new("sqlite::memory:").await.expect("db")
}

fn draft(category_id: CategoryId, order: i64, name: &str) -> PerformerDraft {
    PerformerDraft {
        order,
        name: name.to_string(),
        club: "North".to_string(),
        category_id,
        routine: String::new(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = memory_storage().await;
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("display.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.close().await;

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn seeds_every_setting_with_its_default() {
    let storage = memory_storage().await;
    let settings = storage.settings().await.expect("settings");
    assert_eq!(settings.len(), SettingKey::ALL.len());
    for setting in settings {
        assert_eq!(setting.value, setting.key.default_value());
    }
}

#[tokio::test]
async fn set_setting_round_trips() {
    let storage = memory_storage().await;
    storage
        .set_setting(SettingKey::Title, "Regional Finals")
        .await
        .expect("set");
    assert_eq!(
        storage.setting(SettingKey::Title).await.expect("get"),
        "Regional Finals"
    );
}

#[tokio::test]
async fn set_setting_requires_a_seeded_row() {
    let storage = memory_storage().await;
    sqlx::query("DELETE FROM settings WHERE key = 'subtitle'")
        .execute(storage.pool())
        .await
        .expect("delete row");

    assert_eq!(
        storage.setting(SettingKey::Subtitle).await.expect("get"),
        "Competition Subtitle"
    );
    let err = storage
        .set_setting(SettingKey::Subtitle, "Day 2")
        .await
        .expect_err("unseeded key");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn reset_restores_defaults_but_keeps_the_pointer() {
    let storage = memory_storage().await;
    storage
        .set_setting(SettingKey::BgColor, "#123456")
        .await
        .expect("set");
    storage
        .set_setting(SettingKey::CurrentPerformer, "7")
        .await
        .expect("set");
    storage
        .set_display_mode(DisplayMode::Performer)
        .await
        .expect("mode");

    storage.reset_settings().await.expect("reset");

    assert_eq!(
        storage.setting(SettingKey::BgColor).await.expect("get"),
        "#000000"
    );
    let pointer = storage.display_pointer().await.expect("pointer");
    assert_eq!(pointer.mode, DisplayMode::Performer);
    assert_eq!(pointer.performer_id, PerformerId(7));
}

#[tokio::test]
async fn duplicate_category_names_conflict() {
    let storage = memory_storage().await;
    storage.create_category("Juniors").await.expect("first");
    let err = storage
        .create_category("Juniors")
        .await
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict(_)));

    let seniors = storage.create_category("Seniors").await.expect("second");
    let err = storage
        .rename_category(seniors.id, "Juniors")
        .await
        .expect_err("duplicate rename");
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn rename_of_missing_category_returns_none() {
    let storage = memory_storage().await;
    let renamed = storage
        .rename_category(CategoryId(42), "Masters")
        .await
        .expect("rename");
    assert!(renamed.is_none());
}

#[tokio::test]
async fn performer_with_unknown_category_is_rejected_without_writing() {
    let storage = memory_storage().await;
    let err = storage
        .create_performer(&draft(CategoryId(99), 1, "Ada"))
        .await
        .expect_err("invalid category");
    assert!(matches!(err, StoreError::InvalidReference(CategoryId(99))));

    let category = storage.create_category("Juniors").await.expect("category");
    let performer = storage
        .create_performer(&draft(category.id, 1, "Ada"))
        .await
        .expect("performer");
    let err = storage
        .update_performer(performer.id, &draft(CategoryId(99), 2, "Ada"))
        .await
        .expect_err("invalid category");
    assert!(matches!(err, StoreError::InvalidReference(_)));

    let performers = storage.list_performers().await.expect("list");
    assert_eq!(performers, vec![performer]);
}

#[tokio::test]
async fn update_of_missing_performer_is_not_found() {
    let storage = memory_storage().await;
    let category = storage.create_category("Juniors").await.expect("category");
    let err = storage
        .update_performer(PerformerId(5), &draft(category.id, 1, "Ada"))
        .await
        .expect_err("missing");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn performers_in_category_are_ordered_by_rank() {
    let storage = memory_storage().await;
    let category = storage.create_category("Juniors").await.expect("category");
    for (order, name) in [(3, "Cy"), (1, "Ada"), (2, "Bea")] {
        storage
            .create_performer(&draft(category.id, order, name))
            .await
            .expect("performer");
    }
    let names: Vec<_> = storage
        .performers_in_category(category.id)
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Ada", "Bea", "Cy"]);
}

#[tokio::test]
async fn deleting_the_displayed_performer_clears_the_pointer() {
    let storage = memory_storage().await;
    let category = storage.create_category("Juniors").await.expect("category");
    let performer = storage
        .create_performer(&draft(category.id, 1, "Ada"))
        .await
        .expect("performer");

    let mut uow = storage.begin().await.expect("begin");
    let pointer = uow.display_pointer().await.expect("pointer");
    uow.save_display_pointer(&pointer.selecting(category.id, performer.id))
        .await
        .expect("save");
    uow.commit().await.expect("commit");

    assert!(storage.delete_performer(performer.id).await.expect("delete"));
    let pointer = storage.display_pointer().await.expect("pointer");
    assert_eq!(pointer.performer_id, PerformerId::UNSET);
    assert_eq!(pointer.category_id, category.id);
    assert!(!storage.delete_performer(performer.id).await.expect("again"));
}

#[tokio::test]
async fn deleting_a_category_cascades_to_its_performers() {
    let storage = memory_storage().await;
    let juniors = storage.create_category("Juniors").await.expect("category");
    let seniors = storage.create_category("Seniors").await.expect("category");
    let ada = storage
        .create_performer(&draft(juniors.id, 1, "Ada"))
        .await
        .expect("performer");
    storage
        .create_performer(&draft(seniors.id, 1, "Bea"))
        .await
        .expect("performer");

    let mut uow = storage.begin().await.expect("begin");
    uow.save_display_pointer(&DisplayPointer::cleared().selecting(juniors.id, ada.id))
        .await
        .expect("save");
    uow.commit().await.expect("commit");

    assert!(storage.delete_category(juniors.id).await.expect("delete"));
    let remaining = storage.list_performers().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].category_id, seniors.id);

    let pointer = storage.display_pointer().await.expect("pointer");
    assert!(!pointer.category_id.is_set());
    assert!(!pointer.performer_id.is_set());
    assert!(!storage.delete_category(juniors.id).await.expect("again"));
}

#[tokio::test]
async fn dropped_unit_of_work_rolls_back() {
    let storage = memory_storage().await;
    {
        let mut uow = storage.begin().await.expect("begin");
        uow.save_display_pointer(&DisplayPointer {
            mode: DisplayMode::Performer,
            category_id: CategoryId(1),
            performer_id: PerformerId(1),
        })
        .await
        .expect("save");
    }
    assert_eq!(
        storage.display_pointer().await.expect("pointer"),
        DisplayPointer::cleared()
    );
}

#[tokio::test]
async fn import_assigns_sequential_ranks_and_resets_the_display() {
    let storage = memory_storage().await;
    let old = storage.create_category("Old").await.expect("category");
    storage
        .create_performer(&draft(old.id, 1, "Stale"))
        .await
        .expect("performer");
    storage
        .set_display_mode(DisplayMode::Performer)
        .await
        .expect("mode");

    let rows = [
        RosterRow {
            name: "A".into(),
            club: "X".into(),
            category_name: "Cat1".into(),
            routine: String::new(),
        },
        RosterRow {
            name: "B".into(),
            club: "Y".into(),
            category_name: "Cat1".into(),
            routine: String::new(),
        },
    ];
    let summary = storage.import_roster(&rows).await.expect("import");
    assert_eq!(summary.categories, 1);
    assert_eq!(summary.performers, 2);

    let categories = storage.list_categories().await.expect("categories");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Cat1");

    let ranks: Vec<_> = storage
        .performers_in_category(categories[0].id)
        .await
        .expect("performers")
        .into_iter()
        .map(|p| (p.name, p.order))
        .collect();
    assert_eq!(ranks, [("A".to_string(), 1), ("B".to_string(), 2)]);

    assert_eq!(
        storage.display_pointer().await.expect("pointer"),
        DisplayPointer::cleared()
    );
}

#[tokio::test]
async fn empty_import_leaves_the_roster_alone() {
    let storage = memory_storage().await;
    storage.create_category("Juniors").await.expect("category");
    let err = storage.import_roster(&[]).await.expect_err("empty");
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(storage.list_categories().await.expect("list").len(), 1);
}

#[tokio::test]
async fn failed_import_keeps_the_previous_roster() {
    let storage = memory_storage().await;
    let old = storage.create_category("Old").await.expect("category");
    let stale = storage
        .create_performer(&draft(old.id, 1, "Stale"))
        .await
        .expect("performer");
    let shown = DisplayPointer {
        mode: DisplayMode::Performer,
        category_id: old.id,
        performer_id: stale.id,
    };
    let mut uow = storage.begin().await.expect("begin");
    uow.save_display_pointer(&shown).await.expect("save");
    uow.commit().await.expect("commit");

    sqlx::query(
        "CREATE TRIGGER reject_broken_row BEFORE INSERT ON performers
         WHEN NEW.name = 'Broken'
         BEGIN SELECT RAISE(ABORT, 'rejected row'); END",
    )
    .execute(storage.pool())
    .await
    .expect("trigger");

    let rows = [
        RosterRow {
            name: "A".into(),
            club: "X".into(),
            category_name: "Cat1".into(),
            routine: String::new(),
        },
        RosterRow {
            name: "Broken".into(),
            club: "Y".into(),
            category_name: "Cat2".into(),
            routine: String::new(),
        },
    ];
    let err = storage.import_roster(&rows).await.expect_err("trigger aborts");
    assert!(matches!(err, StoreError::Storage(_)));

    assert_eq!(storage.list_categories().await.expect("categories"), vec![old]);
    assert_eq!(storage.list_performers().await.expect("performers"), vec![stale]);
    assert_eq!(storage.display_pointer().await.expect("pointer"), shown);
}

#[tokio::test]
async fn concurrent_read_then_write_units_are_serialised() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let database_url = normalize_database_url(&temp_root.path().join("busy.db").to_string_lossy());
    let storage = Storage::new(&database_url).await.expect("db");
    let category_id = storage.create_category("Juniors").await.expect("category").id;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let storage = storage.clone();
        tasks.push(tokio::spawn(async move {
            let mut uow = storage.begin().await?;
            let pointer = uow.display_pointer().await?;
            let next = PerformerId(pointer.performer_id.0 + 1);
            uow.save_display_pointer(&pointer.selecting(category_id, next))
                .await?;
            uow.commit().await
        }));
    }
    for task in tasks {
        task.await.expect("join").expect("unit of work");
    }

    let pointer = storage.display_pointer().await.expect("pointer");
    assert_eq!(pointer.performer_id, PerformerId(20));
    storage.close().await;
}

#[test]
fn database_urls_are_normalized() {
    assert_eq!(
        normalize_database_url("./data/database.sqlite"),
        "sqlite://./data/database.sqlite"
    );
    assert_eq!(normalize_database_url("sqlite:data\\x.db"), "sqlite://data/x.db");
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(normalize_database_url(""), DEFAULT_DATABASE_URL);
}

#[test]
fn store_errors_map_to_api_codes() {
    let api: ApiError = StoreError::InvalidReference(CategoryId(3)).into();
    assert!(matches!(api.code, ErrorCode::InvalidReference));
    let api: ApiError = StoreError::NotFound("performer 1 not found".into()).into();
    assert!(matches!(api.code, ErrorCode::NotFound));
    assert_eq!(api.message, "performer 1 not found");
}
