//! Process-wide SQLite handle, opened lazily and shared by every request.

use crate::db::initialize::open_db;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, error, info};

pub type SharedConn = Arc<Mutex<Connection>>;

type Opener = fn(&str) -> AppResult<Connection>;

/// Outcome of one connection attempt, `None` while it is still running.
type AttemptOutcome = Option<Result<SharedConn, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Failed,
}

struct Slot {
    state: ConnectionState,
    conn: Option<SharedConn>,
    in_flight: Option<watch::Receiver<AttemptOutcome>>,
}

enum Role {
    Ready(SharedConn),
    Wait(watch::Receiver<AttemptOutcome>),
    Lead(watch::Sender<AttemptOutcome>),
}

/// Lazily-connected store handle.
///
/// At most one connection attempt runs at a time: callers arriving while an
/// attempt is in flight wait for it and share its outcome, success or
/// failure. A failed attempt leaves no connection behind, so the next caller
/// to arrive after it settles tries again.
pub struct DbPool {
    path: String,
    open: Opener,
    slot: Mutex<Slot>,
    attempts: AtomicUsize,
}

/// Clears the in-flight marker if the leading caller is dropped mid-attempt.
struct AttemptGuard<'a> {
    pool: &'a DbPool,
    settled: bool,
}

impl AttemptGuard<'_> {
    fn settle(&mut self, outcome: &AppResult<SharedConn>) {
        if let Ok(mut slot) = self.pool.slot.lock() {
            slot.in_flight = None;
            match outcome {
                Ok(conn) => {
                    slot.conn = Some(conn.clone());
                    slot.state = ConnectionState::Connected;
                }
                Err(_) => slot.state = ConnectionState::Failed,
            }
        }
        self.settled = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.settled
            && let Ok(mut slot) = self.pool.slot.lock()
        {
            slot.in_flight = None;
            slot.state = ConnectionState::Failed;
        }
    }
}

impl DbPool {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_opener(path, open_db)
    }

    fn with_opener(path: impl Into<String>, open: Opener) -> Self {
        Self {
            path: path.into(),
            open,
            slot: Mutex::new(Slot {
                state: ConnectionState::Idle,
                conn: None,
                in_flight: None,
            }),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> ConnectionState {
        self.slot
            .lock()
            .map(|s| s.state)
            .unwrap_or(ConnectionState::Failed)
    }

    /// Number of connection attempts started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn lock_slot(&self) -> AppResult<MutexGuard<'_, Slot>> {
        self.slot
            .lock()
            .map_err(|_| AppError::Other("database pool lock poisoned".into()))
    }

    /// The shared connection, opening (and migrating) it on first use.
    pub async fn connection(&self) -> AppResult<SharedConn> {
        let role = {
            let mut slot = self.lock_slot()?;
            if let Some(conn) = &slot.conn {
                Role::Ready(conn.clone())
            } else if let Some(rx) = &slot.in_flight {
                Role::Wait(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                slot.in_flight = Some(rx);
                slot.state = ConnectionState::Connecting;
                Role::Lead(tx)
            }
        };

        match role {
            Role::Ready(conn) => {
                debug!("Using cached database connection");
                Ok(conn)
            }
            Role::Wait(rx) => Self::await_attempt(rx).await,
            Role::Lead(tx) => self.connect(tx).await,
        }
    }

    async fn await_attempt(mut rx: watch::Receiver<AttemptOutcome>) -> AppResult<SharedConn> {
        debug!("Waiting for in-flight database connection attempt");

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };

        match outcome {
            Some(Ok(conn)) => Ok(conn),
            Some(Err(msg)) => Err(AppError::Other(format!("database connection failed: {msg}"))),
            None => Err(AppError::Other(
                "database connection attempt was abandoned".into(),
            )),
        }
    }

    async fn connect(&self, tx: watch::Sender<AttemptOutcome>) -> AppResult<SharedConn> {
        let mut guard = AttemptGuard {
            pool: self,
            settled: false,
        };
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let path = self.path.clone();
        let open = self.open;
        let outcome = tokio::task::spawn_blocking(move || open(&path))
            .await
            .map_err(AppError::from)
            .and_then(|r| r)
            .map(|conn| Arc::new(Mutex::new(conn)));

        guard.settle(&outcome);
        tx.send_replace(Some(
            outcome.as_ref().map(Arc::clone).map_err(|e| e.to_string()),
        ));

        match &outcome {
            Ok(_) => info!(path = %self.path, "New database connection established"),
            Err(e) => error!(path = %self.path, error = %e, "Database connection failed"),
        }
        outcome
    }

    /// Run `func` against the shared connection on the blocking thread pool.
    pub async fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection().await?;

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Other("database connection lock poisoned".into()))?;
            func(&mut guard)
        })
        .await?
    }
}
