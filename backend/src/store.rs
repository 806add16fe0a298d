use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use shared::models::{Choice, Tally};
use tracing::{debug, error};
use crate::routes::AppState;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Opening the connection or creating the table failed.
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Query(String),
}

/// An open connection to the vote table.
#[rocket::async_trait]
pub trait VoteStore: Send {
    /// Inserts the ballot, or overwrites the choice already recorded for `voter_id`.
    async fn upsert_vote(&mut self, voter_id: &str, choice: Choice) -> Result<(), StoreError>;

    async fn tally(&mut self) -> Result<Tally, StoreError>;

    async fn close(self: Box<Self>);
}

#[rocket::async_trait]
pub trait StoreConnector: Send + Sync {
    /// Opens a fresh connection with the vote table in place.
    async fn connect(&self) -> Result<Box<dyn VoteStore>, StoreError>;
}

enum Handle {
    Idle,
    Open(Box<dyn VoteStore>),
    Unavailable(String),
}

/// Request-scoped store access.
///
/// The connection is opened on the first call to [`StoreSession::store`] and
/// never more than once per request: a failed attempt leaves the session
/// unavailable until it is dropped. Handlers release the connection with
/// [`StoreSession::close`]; dropping the session releases it on any other
/// exit path.
pub struct StoreSession<'r> {
    connector: &'r dyn StoreConnector,
    handle: Handle,
}

impl<'r> StoreSession<'r> {
    pub fn new(connector: &'r dyn StoreConnector) -> Self {
        Self {
            connector,
            handle: Handle::Idle,
        }
    }

    pub async fn store(&mut self) -> Result<&mut (dyn VoteStore + 'static), StoreError> {
        if let Handle::Idle = self.handle {
            self.handle = match self.connector.connect().await {
                Ok(store) => {
                    debug!("Store connection opened");
                    Handle::Open(store)
                }
                Err(e) => {
                    error!("Database connection error: {}", e);
                    Handle::Unavailable(e.to_string())
                }
            };
        }

        match &mut self.handle {
            Handle::Open(store) => Ok(store.as_mut()),
            Handle::Unavailable(reason) => Err(StoreError::Connect(reason.clone())),
            Handle::Idle => unreachable!("store session is opened above"),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.handle, Handle::Open(_))
    }

    pub async fn close(mut self) {
        if let Handle::Open(store) = mem::replace(&mut self.handle, Handle::Idle) {
            store.close().await;
            debug!("Store connection released");
        }
    }
}

impl Drop for StoreSession<'_> {
    fn drop(&mut self) {
        if self.is_open() {
            debug!("Store session dropped while open, releasing connection");
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for StoreSession<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.rocket().state::<AppState>() {
            Some(state) => Outcome::Success(StoreSession::new(state.connector.as_ref())),
            None => {
                error!("AppState is not managed, cannot open a store session");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

type VoteTable = Mutex<HashMap<String, Choice>>;

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    open: AtomicUsize,
}

/// Process-local store standing in for PostgreSQL in the HTTP tests. Each
/// clone shares the same table and connection counters.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    votes: Arc<VoteTable>,
    counters: Arc<Counters>,
    unavailable: bool,
    query_failure: Option<String>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every connection attempt.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// A store that connects but fails every query with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            query_failure: Some(message.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl MemoryConnector {
    pub fn len(&self) -> usize {
        self.votes.lock().map(|votes| votes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn choice_of(&self, voter_id: &str) -> Option<Choice> {
        self.votes.lock().ok()?.get(voter_id).copied()
    }

    /// Total connections handed out so far.
    pub fn connections_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet released.
    pub fn open_connections(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }
}

