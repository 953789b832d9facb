//! Room store on a SQLite database file.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::models::RoomRow;
use super::schema;
use crate::room::{Room, RoomId};
use crate::store::{Guard, RoomPatch, RoomStore, RoomWatch, StoreError, UpdateOutcome};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default interval between change polls for subscriptions.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Room store backed by one SQLite connection.
///
/// Several processes may open the same file; guarded updates run inside an
/// immediate transaction, which takes SQLite's write lock before the read,
/// so the guard and the write are atomic across processes too.
/// Subscriptions poll the row at a fixed interval.
#[derive(Clone)]
pub struct SqliteStore {
    db_path: String,
    conn: Arc<Mutex<SqliteConnection>>,
    poll_interval: Duration,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path` and applies migrations.
    ///
    /// Use `":memory:"` for a private in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the connection or a migration fails.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String, poll_interval: Duration) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening SQLite room store");
        let mut conn = SqliteConnection::establish(&db_path).map_err(|e| {
            StoreError::backend(format!("Failed to connect to '{}': {}", db_path, e))
        })?;

        conn.batch_execute("PRAGMA busy_timeout = 5000;")?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::backend(format!("Migrations failed: {}", e)))?;
        debug!(count = applied.len(), "Migrations applied");

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
            poll_interval,
        })
    }

    /// Path the store was opened with.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::backend(format!("Connection lock poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::backend(format!("Blocking task failed: {}", e)))?
    }
}

fn load(conn: &mut SqliteConnection, key: &str) -> Result<Option<Room>, StoreError> {
    schema::rooms::table
        .find(key)
        .select(RoomRow::as_select())
        .first(conn)
        .optional()?
        .map(RoomRow::into_room)
        .transpose()
}

#[async_trait]
impl RoomStore for SqliteStore {
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn insert(&self, mut room: Room) -> Result<Room, StoreError> {
        room.last_activity = Utc::now();
        let row = RoomRow::try_from(&room)?;
        self.with_conn(move |conn| {
            diesel::insert_into(schema::rooms::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        info!("Room inserted");
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        let key = id.as_str().to_string();
        self.with_conn(move |conn| load(conn, &key)).await
    }

    #[instrument(skip(self, guard, patch))]
    async fn update(
        &self,
        id: &RoomId,
        guard: Guard,
        patch: RoomPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let key = id.as_str().to_string();
        let outcome = self
            .with_conn(move |conn| {
                conn.immediate_transaction(|conn| {
                    let current = load(conn, &key)?
                        .ok_or_else(|| StoreError::not_found(format!("Room {} not found", key)))?;

                    if !guard.holds(&current) {
                        debug!(conditions = ?guard.conditions(), "Guard rejected update");
                        return Ok(UpdateOutcome::Rejected(current));
                    }
                    if patch.is_empty() {
                        return Ok(UpdateOutcome::Applied(current));
                    }

                    let mut next = current;
                    patch.apply(&mut next);
                    next.last_activity = Utc::now();
                    let row = RoomRow::try_from(&next)?;
                    diesel::update(schema::rooms::table.find(row.id()))
                        .set(&row)
                        .execute(conn)?;
                    Ok(UpdateOutcome::Applied(next))
                })
            })
            .await?;

        if let UpdateOutcome::Applied(room) = &outcome {
            debug!(status = %room.status, round = room.round, game = room.game, "Room updated");
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RoomId) -> Result<(), StoreError> {
        let key = id.as_str().to_string();
        let removed = self
            .with_conn(move |conn| {
                Ok(diesel::delete(schema::rooms::table.find(key.as_str())).execute(conn)?)
            })
            .await?;
        info!(removed, "Room deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, id: &RoomId) -> Result<RoomWatch, StoreError> {
        let initial = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Room {} not found", id)))?;

        let (tx, rx) = watch::channel(Some(initial));
        let store = self.clone();
        let id = id.clone();
        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.poll_interval);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    debug!(room_id = %id, "No subscribers left, stopping poller");
                    break;
                }
                match store.get(&id).await {
                    Ok(Some(room)) => {
                        tx.send_if_modified(|seen| {
                            if seen.as_ref() == Some(&room) {
                                false
                            } else {
                                *seen = Some(room);
                                true
                            }
                        });
                    }
                    Ok(None) => {
                        debug!(room_id = %id, "Room gone, closing feed");
                        tx.send_replace(None);
                        break;
                    }
                    Err(e) => warn!(room_id = %id, error = %e, "Poll failed, will retry"),
                }
            }
        });

        debug!(interval_ms = self.poll_interval.as_millis() as u64, "Subscribed to room");
        Ok(RoomWatch::with_poller(rx, poller))
    }
}
