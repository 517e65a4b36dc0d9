//! Event catalogue client.

use tokio::sync::watch;
use tracing::debug;
use univent_client::{Dispatcher, RequestSpec, Transport, services};
use univent_proto::{
    Envelope,
    payloads::{Event, EventParticipant, EventUpdate, NewEvent, RegistrationDetails},
};
use univent_store::CredentialStore;

use crate::{
    Listing, ServiceError,
    listing::{Published, accepted},
    segment,
};

/// Client of the `events` service.
///
/// The published listing is kept sorted by start date, earliest first.
pub struct EventService<S: CredentialStore, T: Transport> {
    dispatcher: Dispatcher<S, T>,
    events: Published<Event>,
}

impl<S: CredentialStore, T: Transport> Clone for EventService<S, T> {
    fn clone(&self) -> Self {
        Self { dispatcher: self.dispatcher.clone(), events: self.events.clone() }
    }
}

impl<S: CredentialStore, T: Transport> EventService<S, T> {
    /// Create a service with an empty listing.
    pub fn new(dispatcher: Dispatcher<S, T>) -> Self {
        Self { dispatcher, events: Published::new() }
    }

    /// Observe the event listing.
    pub fn subscribe(&self) -> watch::Receiver<Listing<Event>> {
        self.events.subscribe()
    }

    /// Current event listing.
    pub fn snapshot(&self) -> Listing<Event> {
        self.events.snapshot()
    }

    /// `GET /events` (public) and publish the result, earliest first.
    pub async fn fetch_events(&self) -> Result<Vec<Event>, ServiceError> {
        self.events.set_loading(true);
        let spec = RequestSpec::get(services::EVENTS, "/events").public();

        let mut events = match self.dispatcher.execute::<Vec<Event>>(spec).await {
            Ok(events) => events,
            Err(e) => {
                self.events.set_loading(false);
                return Err(e.into());
            },
        };
        sort_by_date(&mut events);
        debug!(count = events.len(), "fetched events");

        self.events.finish(events.clone());
        Ok(events)
    }

    /// `POST /events`; the created event joins the listing.
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, ServiceError> {
        let spec = RequestSpec::post(services::EVENTS, "/events").json(event)?;
        let created: Event = self.dispatcher.execute(spec).await?;

        self.events.modify(|events| {
            events.push(created.clone());
            sort_by_date(events);
        });
        Ok(created)
    }

    /// `PUT /events/{id}` with only the fields set on `update`; the listed
    /// event is replaced in place.
    pub async fn update_event(
        &self,
        id: &str,
        update: &EventUpdate,
    ) -> Result<Event, ServiceError> {
        let path = format!("/events/{}", segment(id));
        let spec = RequestSpec::put(services::EVENTS, path).json(update)?;
        let updated: Event = self.dispatcher.execute(spec).await?;

        self.events.modify(|events| {
            if let Some(slot) = events.iter_mut().find(|event| event.id == id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    /// `POST /events/{id}/register`. Empty details are sent without a body.
    pub async fn register_for_event(
        &self,
        id: &str,
        details: &RegistrationDetails,
    ) -> Result<(), ServiceError> {
        let mut spec = RequestSpec::post(services::EVENTS, registration_path(id));
        if !details.is_empty() {
            spec = spec.json(details)?;
        }

        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        accepted(envelope)?;
        Ok(())
    }

    /// `DELETE /events/{id}/register`.
    pub async fn cancel_registration(&self, id: &str) -> Result<(), ServiceError> {
        let spec = RequestSpec::delete(services::EVENTS, registration_path(id));
        let envelope: Envelope = self.dispatcher.execute(spec).await?;
        accepted(envelope)?;
        Ok(())
    }

    /// `GET /events/{id}/participants`.
    pub async fn participants(&self, id: &str) -> Result<Vec<EventParticipant>, ServiceError> {
        let path = format!("/events/{}/participants", segment(id));
        let spec = RequestSpec::get(services::EVENTS, path);
        Ok(self.dispatcher.execute(spec).await?)
    }

    /// Listed event with `id`, without a request.
    pub fn event(&self, id: &str) -> Option<Event> {
        self.events.find(|event| event.id == id)
    }
}

fn registration_path(id: &str) -> String {
    format!("/events/{}/register", segment(id))
}

fn sort_by_date(events: &mut [Event]) {
    events.sort_by_key(|event| event.date);
}
