use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named persisted queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueName {
    Location,
    ProofOfDelivery,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Location => "location",
            QueueName::ProofOfDelivery => "proof_of_delivery",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw row as stored; the payload is JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRecord {
    pub id: i64,
    pub payload: String,
    pub captured_at: DateTime<Utc>,
}

/// A decoded queue entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEntry<T> {
    pub id: i64,
    pub payload: T,
    pub captured_at: DateTime<Utc>,
}
