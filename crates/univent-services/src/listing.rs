//! Observable collections.

use std::sync::Arc;

use tokio::sync::watch;
use univent_proto::Envelope;

use crate::ServiceError;

/// Last fetched collection of a service and whether a fetch is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Items in display order.
    pub items: Vec<T>,
    /// A fetch is in flight.
    pub is_loading: bool,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { items: Vec::new(), is_loading: false }
    }
}

/// Shared publisher of a [`Listing`].
pub(crate) struct Published<T> {
    tx: Arc<watch::Sender<Listing<T>>>,
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T: Clone> Published<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Listing::default());
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Listing<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> Listing<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|listing| listing.is_loading = loading);
    }

    /// Publish a fetch result and clear the loading flag.
    pub(crate) fn finish(&self, items: Vec<T>) {
        self.tx.send_replace(Listing { items, is_loading: false });
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut Vec<T>)) {
        self.tx.send_modify(|listing| f(&mut listing.items));
    }

    pub(crate) fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.tx.borrow().items.iter().find(|item| predicate(item)).cloned()
    }
}

/// Fail unless the envelope reports success.
pub(crate) fn accepted(envelope: Envelope) -> Result<Envelope, ServiceError> {
    if envelope.success {
        Ok(envelope)
    } else {
        Err(ServiceError::Rejected {
            message: envelope.message.unwrap_or_else(|| "request declined".to_string()),
        })
    }
}
