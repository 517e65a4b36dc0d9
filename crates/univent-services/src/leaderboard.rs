//! Leaderboard client.

use tokio::sync::watch;
use tracing::debug;
use univent_client::{Dispatcher, RequestSpec, Transport, services};
use univent_proto::{
    ApiResponse,
    payloads::{LeaderboardEntry, ScoreSubmission},
};
use univent_store::CredentialStore;

use crate::{Listing, ServiceError, listing::Published, segment};

/// Client of the `leaderboard` service.
///
/// Keeps two listings: the overall top performers and the board of the last
/// event fetched. Rows are published in server order.
pub struct LeaderboardService<S: CredentialStore, T: Transport> {
    dispatcher: Dispatcher<S, T>,
    top: Published<LeaderboardEntry>,
    event: Published<LeaderboardEntry>,
}

impl<S: CredentialStore, T: Transport> Clone for LeaderboardService<S, T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            top: self.top.clone(),
            event: self.event.clone(),
        }
    }
}

impl<S: CredentialStore, T: Transport> LeaderboardService<S, T> {
    /// Create a service with empty listings.
    pub fn new(dispatcher: Dispatcher<S, T>) -> Self {
        Self { dispatcher, top: Published::new(), event: Published::new() }
    }

    /// Observe the top performers listing.
    pub fn subscribe_top(&self) -> watch::Receiver<Listing<LeaderboardEntry>> {
        self.top.subscribe()
    }

    /// Observe the per-event listing.
    pub fn subscribe_event(&self) -> watch::Receiver<Listing<LeaderboardEntry>> {
        self.event.subscribe()
    }

    /// Current top performers.
    pub fn top_performers(&self) -> Listing<LeaderboardEntry> {
        self.top.snapshot()
    }

    /// Current per-event board.
    pub fn event_leaderboard(&self) -> Listing<LeaderboardEntry> {
        self.event.snapshot()
    }

    /// `GET /leaderboard/top?limit={limit}` (public).
    pub async fn fetch_top_performers(
        &self,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let spec = RequestSpec::get(services::LEADERBOARD, "/leaderboard/top")
            .query([("limit", limit.to_string())])
            .public();
        self.fetch_into(&self.top, spec).await
    }

    /// `GET /leaderboard/event/{id}` (public).
    pub async fn fetch_event_leaderboard(
        &self,
        event_id: &str,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let spec = RequestSpec::get(services::LEADERBOARD, event_path(event_id)).public();
        self.fetch_into(&self.event, spec).await
    }

    /// `POST /leaderboard/event/{id}`. Returns the updated row when the
    /// server sends one back.
    pub async fn submit_score(
        &self,
        event_id: &str,
        submission: &ScoreSubmission,
    ) -> Result<Option<LeaderboardEntry>, ServiceError> {
        let spec =
            RequestSpec::post(services::LEADERBOARD, event_path(event_id)).json(submission)?;
        let response: ApiResponse<LeaderboardEntry> = self.dispatcher.execute(spec).await?;

        if !response.success {
            return Err(ServiceError::Rejected {
                message: response.message.unwrap_or_else(|| "score rejected".to_string()),
            });
        }
        Ok(response.data)
    }

    async fn fetch_into(
        &self,
        listing: &Published<LeaderboardEntry>,
        spec: RequestSpec,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        listing.set_loading(true);
        match self.dispatcher.execute::<Vec<LeaderboardEntry>>(spec).await {
            Ok(entries) => {
                debug!(count = entries.len(), "fetched leaderboard");
                listing.finish(entries.clone());
                Ok(entries)
            },
            Err(e) => {
                listing.set_loading(false);
                Err(e.into())
            },
        }
    }
}

fn event_path(event_id: &str) -> String {
    format!("/leaderboard/event/{}", segment(event_id))
}
