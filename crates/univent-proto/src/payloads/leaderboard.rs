//! Leaderboard service types.

use serde::{Deserialize, Serialize};

/// One row of a leaderboard.
///
/// Overall boards fill `total_score` and `event_count`; per-event boards fill
/// `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Ranked account.
    pub user_id: String,
    /// Display name of the account.
    pub user_name: String,
    /// Sum over all events.
    #[serde(default)]
    pub total_score: Option<i64>,
    /// Number of events scored.
    #[serde(default)]
    pub event_count: Option<u32>,
    /// Score in a single event.
    #[serde(default)]
    pub score: Option<i64>,
    /// 1-based position.
    #[serde(default)]
    pub rank: Option<u32>,
}

impl LeaderboardEntry {
    /// `total_score`, falling back to `score`, falling back to zero.
    pub fn display_score(&self) -> i64 {
        self.total_score.or(self.score).unwrap_or(0)
    }

    /// Medal for the podium, `#N` below it, empty when unranked.
    pub fn rank_label(&self) -> String {
        match self.rank {
            None => String::new(),
            Some(1) => "🥇".to_string(),
            Some(2) => "🥈".to_string(),
            Some(3) => "🥉".to_string(),
            Some(rank) => format!("#{rank}"),
        }
    }
}

/// Body of `POST /leaderboard/event/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    /// Scored account.
    pub user_id: String,
    /// Points awarded.
    pub score: i64,
}
