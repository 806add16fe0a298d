use serde::{Serialize, Deserialize};
use std::fmt;

pub const SERVICE_NAME: &str = "voting-api";
pub const VOTE_RECORDED_MESSAGE: &str = "Vote recorded successfully";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    A,
    B,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "a",
            Choice::B => "b",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Choice::A),
            "b" => Some(Choice::B),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated ballot. `voter_id` is `None` when the client left it to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRequest {
    pub vote: Choice,
    pub voter_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteResponse {
    pub success: bool,
    pub voter_id: String,
    pub vote: Choice,
    pub message: String,
}

impl VoteResponse {
    pub fn recorded(voter_id: String, vote: Choice) -> Self {
        Self {
            success: true,
            voter_id,
            vote,
            message: VOTE_RECORDED_MESSAGE.into(),
        }
    }
}

/// Vote counts per choice. Both keys are always present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub a: i64,
    pub b: i64,
}

impl Tally {
    /// Builds a tally from grouped `(choice, count)` rows, ignoring values
    /// that are not a known choice.
    pub fn from_counts<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        rows.into_iter().fold(Tally::default(), |mut tally, (choice, count)| {
            if let Some(choice) = Choice::parse(choice.as_ref()) {
                *tally.get_mut(choice) += count;
            }
            tally
        })
    }

    pub fn get(&self, choice: Choice) -> i64 {
        match choice {
            Choice::A => self.a,
            Choice::B => self.b,
        }
    }

    fn get_mut(&mut self, choice: Choice) -> &mut i64 {
        match choice {
            Choice::A => &mut self.a,
            Choice::B => &mut self.b,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteOptions {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub service: String,
    pub options: VoteOptions,
}

impl ServiceInfo {
    pub fn new(options: VoteOptions) -> Self {
        Self {
            service: SERVICE_NAME.into(),
            options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }
}
