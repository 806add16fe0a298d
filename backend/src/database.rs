use shared::models::{Choice, Tally};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{error, warn};
use crate::store::{StoreConnector, StoreError, VoteStore};

const CREATE_VOTES_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS votes (
        id VARCHAR(255) NOT NULL UNIQUE,
        vote VARCHAR(255) NOT NULL
     )";

const UPSERT_VOTE: &str =
    "INSERT INTO votes (id, vote) VALUES ($1, $2)
     ON CONFLICT (id) DO UPDATE SET vote = EXCLUDED.vote";

const TALLY_VOTES: &str =
    "SELECT vote, COUNT(id) AS count FROM votes GROUP BY vote";

/// Opens one PostgreSQL connection per request.
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[rocket::async_trait]
impl StoreConnector for PgConnector {
    async fn connect(&self) -> Result<Box<dyn VoteStore>, StoreError> {
        let mut conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        if let Err(e) = sqlx::query(CREATE_VOTES_TABLE).execute(&mut conn).await {
            if let Err(close) = conn.close().await {
                warn!("Failed to close connection after schema error: {}", close);
            }
            return Err(StoreError::Connect(e.to_string()));
        }

        Ok(Box::new(PgStore { conn }))
    }
}

struct PgStore {
    conn: PgConnection,
}

fn query_error(e: sqlx::Error) -> StoreError {
    error!("Database error: {}", e);
    StoreError::Query(e.to_string())
}

#[rocket::async_trait]
impl VoteStore for PgStore {
    async fn upsert_vote(&mut self, voter_id: &str, choice: Choice) -> Result<(), StoreError> {
        let mut tx = self.conn.begin().await.map_err(query_error)?;

        let result = sqlx::query(UPSERT_VOTE)
            .bind(voter_id)
            .bind(choice.as_str())
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => tx.commit().await.map_err(query_error),
            Err(e) => {
                let err = query_error(e);
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback failed: {}", rollback);
                }
                Err(err)
            }
        }
    }

    async fn tally(&mut self) -> Result<Tally, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(TALLY_VOTES)
            .fetch_all(&mut self.conn)
            .await
            .map_err(query_error)?;

        Ok(Tally::from_counts(rows))
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }
    }
}
