//! User administration client.

use tokio::sync::watch;
use tracing::{debug, warn};
use univent_client::{RequestSpec, Transport, services};
use univent_proto::{User, UserRole, payloads::RoleUpdate};
use univent_session::SessionManager;
use univent_store::CredentialStore;

use crate::{Listing, ServiceError, listing::Published, segment};

/// Client of the `admin` service.
///
/// Holds the session so it can check the caller's role before listing all
/// users.
pub struct AdminService<S: CredentialStore, T: Transport> {
    session: SessionManager<S, T>,
    users: Published<User>,
}

impl<S: CredentialStore, T: Transport> Clone for AdminService<S, T> {
    fn clone(&self) -> Self {
        Self { session: self.session.clone(), users: self.users.clone() }
    }
}

impl<S: CredentialStore, T: Transport> AdminService<S, T> {
    /// Create a service with an empty listing.
    pub fn new(session: SessionManager<S, T>) -> Self {
        Self { session, users: Published::new() }
    }

    /// Observe the user listing.
    pub fn subscribe(&self) -> watch::Receiver<Listing<User>> {
        self.users.subscribe()
    }

    /// Current user listing.
    pub fn snapshot(&self) -> Listing<User> {
        self.users.snapshot()
    }

    /// `GET /admin/users`.
    ///
    /// Refused with `NotPermitted`, without a request, unless the session's
    /// current user is an admin.
    pub async fn fetch_all_users(&self) -> Result<Vec<User>, ServiceError> {
        if !self.session.current_user().is_some_and(|user| user.is_admin()) {
            warn!("refusing to list users for a non-admin session");
            return Err(ServiceError::NotPermitted { operation: "list users" });
        }

        let spec = RequestSpec::get(services::ADMIN, "/admin/users");
        self.users.set_loading(true);
        match self.session.dispatcher().execute::<Vec<User>>(spec).await {
            Ok(users) => {
                debug!(count = users.len(), "fetched users");
                self.users.finish(users.clone());
                Ok(users)
            },
            Err(e) => {
                self.users.set_loading(false);
                self.session.observe_error(&e);
                Err(e.into())
            },
        }
    }

    /// `GET /admin/users/{id}`.
    pub async fn user_by_id(&self, id: &str) -> Result<User, ServiceError> {
        let spec = RequestSpec::get(services::ADMIN, user_path(id));
        self.execute(spec).await
    }

    /// `PUT /admin/users/{id}/role`; the listed user is replaced.
    pub async fn update_user_role(&self, id: &str, role: UserRole) -> Result<User, ServiceError> {
        let path = format!("{}/role", user_path(id));
        let spec = RequestSpec::put(services::ADMIN, path).json(&RoleUpdate { role })?;
        let updated = self.execute(spec).await?;

        self.users.modify(|users| {
            if let Some(slot) = users.iter_mut().find(|user| user.id == id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    async fn execute(&self, spec: RequestSpec) -> Result<User, ServiceError> {
        self.session.dispatcher().execute(spec).await.map_err(|e| {
            self.session.observe_error(&e);
            ServiceError::from(e)
        })
    }
}

fn user_path(id: &str) -> String {
    format!("/admin/users/{}", segment(id))
}
