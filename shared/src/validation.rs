use serde_json::Value;
use crate::models::{Choice, VoteRequest};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing vote data")]
    MissingVote,
    #[error("Invalid vote option. Must be 'a' or 'b'")]
    InvalidOption,
    #[error("Invalid voter_id. Must be a string")]
    InvalidVoterId,
}

/// Parses a raw `POST /vote` body.
///
/// Bytes that are not UTF-8 JSON count as missing vote data. The body has to
/// be a JSON object carrying a `vote` field whose value is
/// exactly `"a"` or `"b"`. A `voter_id` that is missing, `null` or empty is
/// reported as `None` so the caller can generate one.
pub fn parse_vote_request(body: impl AsRef<[u8]>) -> Result<VoteRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body.as_ref()).map_err(|_| ValidationError::MissingVote)?;
    let fields = value.as_object().ok_or(ValidationError::MissingVote)?;

    let vote = fields.get("vote").ok_or(ValidationError::MissingVote)?;
    let vote = vote.as_str()
        .and_then(Choice::parse)
        .ok_or(ValidationError::InvalidOption)?;

    let voter_id = match fields.get("voter_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) if id.is_empty() => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => return Err(ValidationError::InvalidVoterId),
    };

    Ok(VoteRequest { vote, voter_id })
}
