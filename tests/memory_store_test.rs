//! Tests for the in-memory room store.

use std::time::Duration;

use rps_dueler::{
    Condition, Guard, MemoryStore, Move, PlayerId, Room, RoomId, RoomPatch, RoomStatus,
    RoomStore, Seat, StoreErrorKind, UpdateOutcome,
};

fn code(text: &str) -> RoomId {
    RoomId::parse(text).expect("Valid code")
}

fn fresh_room(id: &str) -> Room {
    Room::new(code(id), PlayerId::from("host"), 3)
}

async fn seeded() -> (MemoryStore, RoomId) {
    let store = MemoryStore::new();
    let room = store.insert(fresh_room("ROOM01")).await.expect("Insert failed");
    (store, room.id)
}

#[tokio::test]
async fn test_insert_then_get() {
    let (store, id) = seeded().await;
    assert_eq!(store.len(), 1);

    let room = store.get(&id).await.expect("Get failed").expect("Room missing");
    assert_eq!(room.player1_id, PlayerId::from("host"));
    assert_eq!(room.status, RoomStatus::WaitingForOpponent);
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    assert!(store.get(&code("NOPE")).await.expect("Get failed").is_none());
}

#[tokio::test]
async fn test_duplicate_insert_conflicts() {
    let (store, _) = seeded().await;
    let err = store
        .insert(fresh_room("ROOM01"))
        .await
        .expect_err("Duplicate insert should fail");
    assert_eq!(err.kind, StoreErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .update(&code("NOPE"), Guard::none(), RoomPatch::new().round(2))
        .await
        .expect_err("Update should fail");
    assert_eq!(err.kind, StoreErrorKind::NotFound);
}

#[tokio::test]
async fn test_guard_rejection_leaves_room_unchanged() {
    let (store, id) = seeded().await;
    let guard = Guard::none().with(Condition::Status(RoomStatus::Playing));
    let outcome = store
        .update(&id, guard, RoomPatch::new().player1_move(Some(Move::Rock)))
        .await
        .expect("Update failed");

    match outcome {
        UpdateOutcome::Rejected(current) => assert_eq!(current.player1_move, None),
        UpdateOutcome::Applied(_) => panic!("Guard should have rejected the write"),
    }
    let room = store.get(&id).await.expect("Get failed").expect("Room missing");
    assert_eq!(room.player1_move, None);
}

#[tokio::test]
async fn test_stale_fence_is_rejected() {
    let (store, id) = seeded().await;
    let before = store.get(&id).await.expect("Get failed").expect("Room missing");

    let advanced = store
        .update(&id, Guard::fenced(&before), RoomPatch::new().round(2))
        .await
        .expect("Update failed");
    assert!(advanced.is_applied());

    let stale = store
        .update(&id, Guard::fenced(&before), RoomPatch::new().player1_score(9))
        .await
        .expect("Update failed");
    assert!(!stale.is_applied());
    assert_eq!(stale.room().round, 2);
    assert_eq!(stale.room().player1_score, 0);
}

#[tokio::test]
async fn test_new_game_fence_differs_after_reset() {
    let (store, id) = seeded().await;
    let first = store.get(&id).await.expect("Get failed").expect("Room missing");

    // Reset brings round back to 1, but the game counter moves on.
    store
        .update(&id, Guard::none(), RoomPatch::new().new_game(first.game + 1))
        .await
        .expect("Update failed");
    let stale = store
        .update(&id, Guard::fenced(&first), RoomPatch::new().player1_score(1))
        .await
        .expect("Update failed");
    assert!(!stale.is_applied());
    assert_eq!(stale.room().round, first.round);
}

#[tokio::test]
async fn test_seat_claim_guard() {
    let (store, id) = seeded().await;
    let claim = |who: &str| {
        (
            Guard::none().with(Condition::Player2Vacant),
            RoomPatch::new().player2_id(Some(PlayerId::from(who))),
        )
    };

    let (guard, patch) = claim("alice");
    assert!(store.update(&id, guard, patch).await.expect("Update failed").is_applied());
    let (guard, patch) = claim("bob");
    let second = store.update(&id, guard, patch).await.expect("Update failed");
    assert!(!second.is_applied());
    assert_eq!(second.room().player2_id, Some(PlayerId::from("alice")));
}

#[tokio::test]
async fn test_move_unset_guard() {
    let (store, id) = seeded().await;
    let guard = || Guard::none().with(Condition::MoveUnset(Seat::Player1));
    let first = store
        .update(&id, guard(), RoomPatch::new().seat_move(Seat::Player1, Some(Move::Rock)))
        .await
        .expect("Update failed");
    assert!(first.is_applied());

    let second = store
        .update(&id, guard(), RoomPatch::new().seat_move(Seat::Player1, Some(Move::Paper)))
        .await
        .expect("Update failed");
    assert!(!second.is_applied());
    assert_eq!(second.room().player1_move, Some(Move::Rock));
}

#[tokio::test]
async fn test_updates_advance_last_activity() {
    let (store, id) = seeded().await;
    let before = store.get(&id).await.expect("Get failed").expect("Room missing");
    let after = store
        .update(&id, Guard::none(), RoomPatch::new().player1_online(false))
        .await
        .expect("Update failed");
    assert!(after.room().last_activity >= before.last_activity);
    assert!(!after.room().player1_online);
}

#[tokio::test]
async fn test_empty_patch_writes_nothing() {
    let (store, id) = seeded().await;
    let before = store.get(&id).await.expect("Get failed").expect("Room missing");
    let mut watch = store.subscribe(&id).await.expect("Subscribe failed");

    let outcome = store
        .update(&id, Guard::fenced(&before), RoomPatch::new())
        .await
        .expect("Update failed");
    assert!(outcome.is_applied());
    assert_eq!(outcome.room(), &before);

    let quiet = tokio::time::timeout(Duration::from_millis(50), watch.changed()).await;
    assert!(quiet.is_err(), "No change should be published");

    let rejected = store
        .update(
            &id,
            Guard::none().with(Condition::Status(RoomStatus::Playing)),
            RoomPatch::new(),
        )
        .await
        .expect("Update failed");
    assert!(!rejected.is_applied());
}

#[tokio::test]
async fn test_subscription_sees_updates() {
    let (store, id) = seeded().await;
    let mut watch = store.subscribe(&id).await.expect("Subscribe failed");
    assert_eq!(watch.current().map(|r| r.round), Some(1));

    store
        .update(&id, Guard::none(), RoomPatch::new().status(RoomStatus::Playing))
        .await
        .expect("Update failed");

    let seen = watch.changed().await.expect("Feed closed");
    assert_eq!(seen.status, RoomStatus::Playing);
}

#[tokio::test]
async fn test_delete_closes_subscription() {
    let (store, id) = seeded().await;
    let mut watch = store.subscribe(&id).await.expect("Subscribe failed");

    store.delete(&id).await.expect("Delete failed");
    assert!(watch.changed().await.is_none());
    assert!(store.get(&id).await.expect("Get failed").is_none());
    assert!(store.is_empty());

    // Deleting again is a no-op.
    store.delete(&id).await.expect("Second delete failed");
}

#[tokio::test]
async fn test_subscribe_missing_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .subscribe(&code("NOPE"))
        .await
        .expect_err("Subscribe should fail");
    assert_eq!(err.kind, StoreErrorKind::NotFound);
}
