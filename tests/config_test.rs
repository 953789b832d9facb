//! Tests for game configuration loading.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use rps_dueler::{BackendKind, GameConfig, LlmProvider, PlayerId, RoomStore};

#[test]
fn test_defaults() {
    let config = GameConfig::default();
    assert_eq!(config.player_name(), "Player");
    assert_eq!(*config.backend(), BackendKind::Sqlite);
    assert_eq!(config.db_path(), "rps_dueler.db");
    assert_eq!(*config.target_score(), 3);
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.suggestion_timeout(), Duration::from_secs(10));
    assert_eq!(*config.llm_provider(), LlmProvider::Anthropic);
    assert!(config.player_id().is_none());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = GameConfig::from_toml("").expect("Parse failed");
    assert_eq!(config, GameConfig::default());
}

#[test]
fn test_partial_toml_overrides() {
    let config = GameConfig::from_toml(
        r#"
player_name = "Ada"
backend = "memory"
target_score = 5
llm_provider = "openai"
llm_model = "gpt-4o-mini"
"#,
    )
    .expect("Parse failed");

    assert_eq!(config.player_name(), "Ada");
    assert_eq!(*config.backend(), BackendKind::Memory);
    assert_eq!(*config.target_score(), 5);
    assert_eq!(*config.llm_provider(), LlmProvider::OpenAI);
    assert_eq!(config.llm_model(), "gpt-4o-mini");
    assert_eq!(config.db_path(), "rps_dueler.db");
}

#[test]
fn test_zero_target_score_rejected() {
    assert!(GameConfig::from_toml("target_score = 0").is_err());
}

#[test]
fn test_tiny_poll_interval_rejected() {
    assert!(GameConfig::from_toml("poll_interval_ms = 1").is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    let err = GameConfig::from_toml("target_score = \"lots\"").expect_err("Should fail");
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_unknown_backend_rejected() {
    assert!(GameConfig::from_toml("backend = \"postgres\"").is_err());
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("rps_dueler.toml");
    fs::write(&path, "player_name = \"Grace\"\nplayer_id = \"grace-1\"\n")
        .expect("Failed to write TOML");

    let config = GameConfig::from_file(&path).expect("Load failed");
    assert_eq!(config.player_name(), "Grace");
    assert_eq!(config.player_identity(), PlayerId::from("grace-1"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config =
        GameConfig::load_or_default(dir.path().join("absent.toml")).expect("Load failed");
    assert_eq!(config, GameConfig::default());
    assert!(GameConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_generated_identity_is_fresh() {
    let config = GameConfig::default();
    assert_ne!(config.player_identity(), config.player_identity());

    let blank = GameConfig::default().with_player_id("   ".to_string());
    assert_ne!(blank.player_identity(), PlayerId::from("   "));
}

#[test]
fn test_setters_override() {
    let config = GameConfig::default()
        .with_backend(BackendKind::Memory)
        .with_target_score(1)
        .with_db_path("other.db".to_string());
    assert_eq!(*config.backend(), BackendKind::Memory);
    assert_eq!(*config.target_score(), 1);
    assert_eq!(config.db_path(), "other.db");
    config.validate().expect("Valid config");
}

#[tokio::test]
async fn test_open_memory_store() {
    let config = GameConfig::default().with_backend(BackendKind::Memory);
    let store = config.open_store().expect("Open failed");
    let id = rps_dueler::RoomId::parse("ABC").expect("Valid code");
    assert!(store.get(&id).await.expect("Get failed").is_none());
}

#[tokio::test]
async fn test_open_sqlite_store() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("rooms.db").to_str().expect("Invalid path").to_string();
    let config = GameConfig::default().with_db_path(db_path);
    let store = config.open_store().expect("Open failed");
    let id = rps_dueler::RoomId::parse("ABC").expect("Valid code");
    assert!(store.get(&id).await.expect("Get failed").is_none());
}
