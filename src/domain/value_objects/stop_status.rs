use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Pending,
    #[serde(alias = "in-progress")]
    InProgress,
    Arrived,
    #[serde(alias = "completed")]
    Delivered,
    Failed,
    Skipped,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Pending => "pending",
            StopStatus::InProgress => "in_progress",
            StopStatus::Arrived => "arrived",
            StopStatus::Delivered => "delivered",
            StopStatus::Failed => "failed",
            StopStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(StopStatus::Pending),
            "in_progress" | "in-progress" => Ok(StopStatus::InProgress),
            "arrived" => Ok(StopStatus::Arrived),
            "delivered" | "completed" => Ok(StopStatus::Delivered),
            "failed" => Ok(StopStatus::Failed),
            "skipped" => Ok(StopStatus::Skipped),
            other => Err(format!("Unknown stop status: {other}")),
        }
    }
}
