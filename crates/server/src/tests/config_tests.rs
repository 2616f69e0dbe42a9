use super::*;

use std::collections::HashMap;

use storage::normalize_database_url;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_environment() {
    let settings = load_settings_from(Path::new("does-not-exist.toml"), env_from(&[]));
    assert_eq!(settings.server_bind, "0.0.0.0:3000");
    assert_eq!(settings.database_url, "sqlite://./data/database.sqlite");
    assert_eq!(settings.environment, Environment::Development);
    assert_eq!(settings.max_body_bytes, 2 * 1024 * 1024);
}

#[test]
fn file_values_are_overridden_by_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        "bind_addr = \"127.0.0.1:9000\"\ndatabase_url = \"sqlite://./file.db\"\nenvironment = \"production\"\nmax_body_bytes = 4096\n",
    )
    .expect("write config");

    let from_file = load_settings_from(&path, env_from(&[]));
    assert_eq!(from_file.server_bind, "127.0.0.1:9000");
    assert_eq!(from_file.database_url, "sqlite://./file.db");
    assert_eq!(from_file.environment, Environment::Production);
    assert_eq!(from_file.max_body_bytes, 4096);

    let overridden = load_settings_from(
        &path,
        env_from(&[
            ("APP__BIND_ADDR", "127.0.0.1:7000"),
            ("DATABASE_URL", "sqlite://./env.db"),
            ("NODE_ENV", "development"),
        ]),
    );
    assert_eq!(overridden.server_bind, "127.0.0.1:7000");
    assert_eq!(overridden.database_url, "sqlite://./env.db");
    assert_eq!(overridden.environment, Environment::Development);
}

#[test]
fn port_and_db_path_shortcuts() {
    let settings = load_settings_from(
        Path::new("does-not-exist.toml"),
        env_from(&[("PORT", "8080"), ("DB_PATH", "/var/lib/display/")]),
    );
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(
        settings.database_url,
        "sqlite:///var/lib/display/database.sqlite"
    );

    let explicit = load_settings_from(
        Path::new("does-not-exist.toml"),
        env_from(&[
            ("PORT", "8080"),
            ("SERVER_BIND", "127.0.0.1:1234"),
            ("DB_PATH", "/data"),
            ("APP__DATABASE_URL", "sqlite::memory:"),
        ]),
    );
    assert_eq!(explicit.server_bind, "127.0.0.1:1234");
    assert_eq!(explicit.database_url, "sqlite::memory:");
}

#[test]
fn invalid_body_limit_keeps_default() {
    let settings = load_settings_from(
        Path::new("does-not-exist.toml"),
        env_from(&[("APP__MAX_BODY_BYTES", "lots"), ("APP__ENV", "staging")]),
    );
    assert_eq!(settings.max_body_bytes, 2 * 1024 * 1024);
    assert_eq!(settings.environment, Environment::Development);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:data\\test.db"),
        "sqlite://data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("  "),
        ServerSettings::default().database_url
    );
}

#[tokio::test]
async fn normalized_url_opens_a_fresh_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("nested").join("database.sqlite");

    let url = normalize_database_url(db_path.to_string_lossy().as_ref());
    let storage = storage::Storage::new(&url).await.expect("open sqlite");
    storage.close().await;

    assert!(db_path.exists(), "database file should exist: {}", db_path.display());
}
