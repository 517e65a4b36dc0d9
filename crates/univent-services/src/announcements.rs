//! Announcement feed client.

use tokio::sync::watch;
use tracing::debug;
use univent_client::{Dispatcher, RequestSpec, Transport, services};
use univent_proto::{
    Envelope,
    payloads::{Announcement, AnnouncementQuery, AnnouncementUpdate, NewAnnouncement},
};
use univent_store::CredentialStore;

use crate::{
    Listing, ServiceError,
    listing::{Published, accepted},
    segment,
};

/// Client of the `announcements` service.
///
/// The published listing is newest first.
pub struct AnnouncementService<S: CredentialStore, T: Transport> {
    dispatcher: Dispatcher<S, T>,
    announcements: Published<Announcement>,
}

impl<S: CredentialStore, T: Transport> Clone for AnnouncementService<S, T> {
    fn clone(&self) -> Self {
        Self { dispatcher: self.dispatcher.clone(), announcements: self.announcements.clone() }
    }
}

impl<S: CredentialStore, T: Transport> AnnouncementService<S, T> {
    /// Create a service with an empty listing.
    pub fn new(dispatcher: Dispatcher<S, T>) -> Self {
        Self { dispatcher, announcements: Published::new() }
    }

    /// Observe the announcement listing.
    pub fn subscribe(&self) -> watch::Receiver<Listing<Announcement>> {
        self.announcements.subscribe()
    }

    /// Current announcement listing.
    pub fn snapshot(&self) -> Listing<Announcement> {
        self.announcements.snapshot()
    }

    /// `GET /announcements` (public) for published announcements matching
    /// `query`, newest first.
    pub async fn fetch_announcements(
        &self,
        query: &AnnouncementQuery,
    ) -> Result<Vec<Announcement>, ServiceError> {
        let spec = RequestSpec::get(services::ANNOUNCEMENTS, "/announcements")
            .query(query.pairs())
            .public();

        self.announcements.set_loading(true);
        let mut announcements = match self.dispatcher.execute::<Vec<Announcement>>(spec).await {
            Ok(announcements) => announcements,
            Err(e) => {
                self.announcements.set_loading(false);
                return Err(e.into());
            },
        };
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = announcements.len(), "fetched announcements");

        self.announcements.finish(announcements.clone());
        Ok(announcements)
    }

    /// `POST /announcements`; the created announcement goes to the front.
    pub async fn create_announcement(
        &self,
        announcement: &NewAnnouncement,
    ) -> Result<Announcement, ServiceError> {
        let spec =
            RequestSpec::post(services::ANNOUNCEMENTS, "/announcements").json(announcement)?;
        let created: Announcement = self.dispatcher.execute(spec).await?;

        self.announcements.modify(|items| items.insert(0, created.clone()));
        Ok(created)
    }

    /// `PUT /announcements/{id}`; the listed announcement is replaced.
    pub async fn update_announcement(
        &self,
        id: &str,
        update: &AnnouncementUpdate,
    ) -> Result<Announcement, ServiceError> {
        let spec = RequestSpec::put(services::ANNOUNCEMENTS, announcement_path(id)).json(update)?;
        let updated: Announcement = self.dispatcher.execute(spec).await?;

        self.announcements.modify(|items| {
            if let Some(slot) = items.iter_mut().find(|item| item.id == id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    /// `DELETE /announcements/{id}`; the announcement leaves the listing.
    pub async fn delete_announcement(&self, id: &str) -> Result<(), ServiceError> {
        let spec = RequestSpec::delete(services::ANNOUNCEMENTS, announcement_path(id));
        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        accepted(envelope)?;

        self.announcements.modify(|items| items.retain(|item| item.id != id));
        Ok(())
    }
}

fn announcement_path(id: &str) -> String {
    format!("/announcements/{}", segment(id))
}
