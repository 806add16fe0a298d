use rocket::{State, get, post, http::Status, serde::json::Json};
use rocket::data::{Data, Limits};
use tracing::{debug, error, info, instrument, warn};
use shared::models::*;
use shared::validation::parse_vote_request;
use crate::{
    error::ApiError,
    store::{StoreConnector, StoreSession},
    voter_id::VoterIdGenerator,
};

pub struct AppState {
    pub info: ServiceInfo,
    pub connector: Box<dyn StoreConnector>,
    pub voter_ids: VoterIdGenerator,
}

impl AppState {
    pub fn new(options: VoteOptions, connector: impl StoreConnector + 'static) -> Self {
        Self {
            info: ServiceInfo::new(options),
            connector: Box::new(connector),
            voter_ids: VoterIdGenerator::new(),
        }
    }
}

/// Reads the raw body up to the configured `json` limit. Decoding is left to
/// `parse_vote_request` so undecodable bytes are reported as missing vote data.
async fn read_body(data: Data<'_>, limits: &Limits) -> Result<Vec<u8>, ApiError> {
    let limit = limits.get("json").unwrap_or(Limits::JSON);
    let body = data.open(limit).into_bytes().await.map_err(|e| {
        error!("Failed to read request body: {}", e);
        ApiError::Internal
    })?;

    if !body.is_complete() {
        warn!("Vote body exceeded the {} limit", limit);
        return Err(ApiError::PayloadTooLarge);
    }
    Ok(body.into_inner())
}

async fn record_vote(
    state: &AppState,
    session: &mut StoreSession<'_>,
    data: Data<'_>,
    limits: &Limits,
) -> Result<VoteResponse, ApiError> {
    let body = read_body(data, limits).await?;
    let request = parse_vote_request(&body).map_err(|e| {
        debug!("Rejected vote: {}", e);
        ApiError::from(e)
    })?;
    let voter_id = state.voter_ids.resolve(request.voter_id)?;

    session.store().await?
        .upsert_vote(&voter_id, request.vote)
        .await?;

    info!(voter_id = %voter_id, vote = %request.vote, "Vote recorded");
    Ok(VoteResponse::recorded(voter_id, request.vote))
}

async fn read_tally(session: &mut StoreSession<'_>) -> Result<Tally, ApiError> {
    Ok(session.store().await?.tally().await?)
}

#[instrument(skip(state, session, limits, data))]
#[post("/vote", data = "<data>")]
pub async fn submit_vote(
    state: &State<AppState>,
    session: StoreSession<'_>,
    limits: &Limits,
    data: Data<'_>,
) -> Result<Json<VoteResponse>, ApiError> {
    let mut session = session;
    let result = record_vote(state, &mut session, data, limits).await;
    session.close().await;
    result.map(Json)
}

#[instrument(skip(session))]
#[get("/results")]
pub async fn get_results(session: StoreSession<'_>) -> Result<Json<Tally>, ApiError> {
    let mut session = session;
    let result = read_tally(&mut session).await;
    session.close().await;
    result.map(Json)
}

#[get("/")]
pub fn get_info(state: &State<AppState>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

#[get("/healthz")]
pub fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
