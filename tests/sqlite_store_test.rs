//! Tests for the SQLite room store.

use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use rps_dueler::{
    Condition, Guard, Move, PlayerId, Room, RoomError, RoomId, RoomPatch, RoomSession,
    RoomStatus, RoomStore, Seat, SqliteStore, StoreErrorKind,
};

const POLL: Duration = Duration::from_millis(20);
const WAIT: Duration = Duration::from_secs(2);

/// Creates a temporary database file and opens a store on it. The file
/// handle must stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path, POLL).expect("Failed to open store");
    (db_file, store)
}

fn second_handle(db_file: &NamedTempFile) -> SqliteStore {
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    SqliteStore::open(db_path, POLL).expect("Failed to open second store")
}

fn code(text: &str) -> RoomId {
    RoomId::parse(text).expect("Valid code")
}

#[tokio::test]
async fn test_insert_then_get_round_trips_fields() {
    let (_db, store) = setup_test_db();
    let mut room = Room::new(code("ROOM01"), PlayerId::from("host"), 4);
    room.player2_id = Some(PlayerId::from("guest"));
    room.player2_move = Some(Move::Scissors);
    room.status = RoomStatus::Playing;
    room.game = 2;
    store.insert(room).await.expect("Insert failed");

    let loaded = store
        .get(&code("ROOM01"))
        .await
        .expect("Get failed")
        .expect("Room missing");
    assert_eq!(loaded.player1_id, PlayerId::from("host"));
    assert_eq!(loaded.player2_id, Some(PlayerId::from("guest")));
    assert_eq!(loaded.player1_move, None);
    assert_eq!(loaded.player2_move, Some(Move::Scissors));
    assert_eq!(loaded.status, RoomStatus::Playing);
    assert_eq!(loaded.target_score, 4);
    assert_eq!(loaded.fence(), (2, 1));
    assert!(loaded.player1_online);
    assert!(!loaded.player2_online);
}

#[tokio::test]
async fn test_in_memory_database() {
    let store = SqliteStore::open(":memory:".to_string(), POLL).expect("Failed to open store");
    store
        .insert(Room::new(code("MEM1"), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");
    assert!(store.get(&code("MEM1")).await.expect("Get failed").is_some());
}

#[tokio::test]
async fn test_duplicate_insert_conflicts() {
    let (_db, store) = setup_test_db();
    store
        .insert(Room::new(code("ROOM01"), PlayerId::from("a"), 3))
        .await
        .expect("Insert failed");
    let err = store
        .insert(Room::new(code("ROOM01"), PlayerId::from("b"), 3))
        .await
        .expect_err("Duplicate insert should fail");
    assert_eq!(err.kind, StoreErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let (_db, store) = setup_test_db();
    let err = store
        .update(&code("NOPE"), Guard::none(), RoomPatch::new().round(2))
        .await
        .expect_err("Update should fail");
    assert_eq!(err.kind, StoreErrorKind::NotFound);
}

#[tokio::test]
async fn test_guarded_update() {
    let (_db, store) = setup_test_db();
    let id = code("ROOM01");
    store
        .insert(Room::new(id.clone(), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");
    let before = store.get(&id).await.expect("Get failed").expect("Room missing");

    let applied = store
        .update(
            &id,
            Guard::fenced(&before).with(Condition::Player2Vacant),
            RoomPatch::new()
                .player2_id(Some(PlayerId::from("guest")))
                .status(RoomStatus::Playing),
        )
        .await
        .expect("Update failed");
    assert!(applied.is_applied());

    let rejected = store
        .update(
            &id,
            Guard::none().with(Condition::Player2Vacant),
            RoomPatch::new().player2_id(Some(PlayerId::from("intruder"))),
        )
        .await
        .expect("Update failed");
    assert!(!rejected.is_applied());
    assert_eq!(rejected.room().player2_id, Some(PlayerId::from("guest")));

    let cleared = store
        .update(&id, Guard::none(), RoomPatch::new().player2_id(None))
        .await
        .expect("Update failed");
    assert_eq!(cleared.room().player2_id, None);
    let reloaded = store.get(&id).await.expect("Get failed").expect("Room missing");
    assert_eq!(reloaded.player2_id, None, "Cleared seat must be written as NULL");
}

#[tokio::test]
async fn test_delete_removes_room() {
    let (_db, store) = setup_test_db();
    let id = code("ROOM01");
    store
        .insert(Room::new(id.clone(), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");
    store.delete(&id).await.expect("Delete failed");
    assert!(store.get(&id).await.expect("Get failed").is_none());
}

#[tokio::test]
async fn test_subscription_sees_writes_from_another_handle() {
    let (db, store) = setup_test_db();
    let other = second_handle(&db);
    let id = code("ROOM01");
    store
        .insert(Room::new(id.clone(), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");

    let mut watch = store.subscribe(&id).await.expect("Subscribe failed");
    other
        .update(&id, Guard::none(), RoomPatch::new().player1_move(Some(Move::Paper)))
        .await
        .expect("Update failed");

    let seen = tokio::time::timeout(WAIT, watch.changed())
        .await
        .expect("Timed out waiting for change")
        .expect("Feed closed");
    assert_eq!(seen.player1_move, Some(Move::Paper));
}

#[tokio::test]
async fn test_subscription_closes_when_room_deleted() {
    let (db, store) = setup_test_db();
    let other = second_handle(&db);
    let id = code("ROOM01");
    store
        .insert(Room::new(id.clone(), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");

    let mut watch = store.subscribe(&id).await.expect("Subscribe failed");
    other.delete(&id).await.expect("Delete failed");

    let seen = tokio::time::timeout(WAIT, watch.changed())
        .await
        .expect("Timed out waiting for close");
    assert!(seen.is_none());
}

#[tokio::test]
async fn test_sessions_play_across_handles() {
    let (db, store) = setup_test_db();
    let host_store: Arc<dyn RoomStore> = Arc::new(store);
    let guest_store: Arc<dyn RoomStore> = Arc::new(second_handle(&db));

    let mut host = RoomSession::new(host_store.clone(), PlayerId::generate(), 2);
    let mut guest = RoomSession::new(guest_store, PlayerId::generate(), 2);

    let id = host.create_room().await.expect("Create failed");
    assert_eq!(guest.join_room(id.as_str()).await.expect("Join failed"), Seat::Player2);

    host.submit_move(Move::Rock).await.expect("Submit failed");
    guest.submit_move(Move::Scissors).await.expect("Submit failed");

    let room = host_store.get(&id).await.expect("Get failed").expect("Room missing");
    assert_eq!(room.status, RoomStatus::Result);
    assert_eq!((room.player1_score, room.player2_score), (1, 0));
}

#[tokio::test]
async fn test_concurrent_joins_across_handles_have_one_winner() {
    let (db, store) = setup_test_db();
    let host_store: Arc<dyn RoomStore> = Arc::new(store);
    let mut host = RoomSession::new(host_store.clone(), PlayerId::generate(), 3);
    let id = host.create_room().await.expect("Create failed");

    let mut a = RoomSession::new(Arc::new(second_handle(&db)), PlayerId::generate(), 3);
    let mut b = RoomSession::new(Arc::new(second_handle(&db)), PlayerId::generate(), 3);
    let (ra, rb) = tokio::join!(a.join_room(id.as_str()), b.join_room(id.as_str()));

    assert_eq!([ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert!(matches!(ra.err().or(rb.err()), Some(RoomError::RoomFull(_))));
}

#[tokio::test]
async fn test_debug_shows_path_and_interval() {
    let (db, store) = setup_test_db();
    let shown = format!("{:?}", store);
    assert!(shown.starts_with("SqliteStore"));
    assert!(shown.contains(db.path().to_str().expect("Invalid path")));
    assert!(shown.contains("poll_interval"));

    let shared: Arc<dyn RoomStore> = Arc::new(store);
    assert!(format!("{:?}", shared).contains("db_path"));
}

#[tokio::test]
async fn test_empty_patch_leaves_row_untouched() {
    let (_db, store) = setup_test_db();
    let id = code("ROOM01");
    store
        .insert(Room::new(id.clone(), PlayerId::from("host"), 3))
        .await
        .expect("Insert failed");
    let before = store.get(&id).await.expect("Get failed").expect("Room missing");

    let outcome = store
        .update(&id, Guard::fenced(&before), RoomPatch::new())
        .await
        .expect("Update failed");
    assert!(outcome.is_applied());

    let reloaded = store.get(&id).await.expect("Get failed").expect("Room missing");
    assert_eq!(reloaded, before);
}
