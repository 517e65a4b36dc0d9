//! Fault-injecting credential store wrapper.
//!
//! Delegates to an inner store but fails a configurable fraction of calls
//! with `CredentialError::Io`. Drives the failure-path tests of the session
//! layer: a login whose token write fails must leave nothing behind.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{CredentialError, CredentialStore, Secret};

const DEFAULT_SEED: u64 = 0x5EED_C4A0_5000_0F0F;

/// Store wrapper that randomly fails operations.
///
/// Deterministic for a given seed, so failing runs can be replayed. Clones
/// share the RNG and the operation counter.
#[derive(Clone)]
pub struct ChaoticCredentialStore<S: CredentialStore> {
    inner: S,
    /// 0.0 never fails, 1.0 always fails
    failure_rate: f64,
    rng: Arc<Mutex<Lcg>>,
    operations: Arc<AtomicUsize>,
}

/// Linear congruential generator (Numerical Recipes constants).
struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    /// Next value in [0.0, 1.0)
    #[allow(clippy::cast_precision_loss, reason = "state is below 2^32")]
    fn next_unit(&mut self) -> f64 {
        self.state = Self::A.wrapping_mul(self.state).wrapping_add(Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }
}

impl<S: CredentialStore> ChaoticCredentialStore<S> {
    /// Wrap `inner`, failing roughly `failure_rate` of all operations.
    ///
    /// Rates outside [0.0, 1.0] are clamped.
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, DEFAULT_SEED)
    }

    /// Same as [`Self::new`] with an explicit seed.
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(Lcg { state: seed })),
            operations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrapped store, for checking what actually landed after chaos.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of operations attempted through this wrapper, failed or not.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn inject(&self, op: &'static str) -> Result<(), CredentialError> {
        self.operations.fetch_add(1, Ordering::SeqCst);

        let fail = self
            .rng
            .lock()
            .map_err(|_| CredentialError::Unavailable("chaos rng lock poisoned".to_string()))?
            .next_unit()
            < self.failure_rate;

        if fail {
            tracing::debug!(op, "injecting credential store failure");
            return Err(CredentialError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: CredentialStore> CredentialStore for ChaoticCredentialStore<S> {
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        self.inject("set")?;
        self.inner.set(name, value)
    }

    fn get(&self, name: &str) -> Result<Option<Secret>, CredentialError> {
        self.inject("get")?;
        self.inner.get(name)
    }

    fn delete(&self, name: &str) -> Result<(), CredentialError> {
        self.inject("delete")?;
        self.inner.delete(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACCESS_TOKEN, MemoryCredentialStore};

    #[test]
    fn zero_rate_never_fails() {
        let store = ChaoticCredentialStore::new(MemoryCredentialStore::new(), 0.0);
        for i in 0..100 {
            store.set(ACCESS_TOKEN, &i.to_string()).expect("no failures at rate 0");
        }
        assert_eq!(store.operation_count(), 100);
    }

    #[test]
    fn full_rate_always_fails_and_leaves_inner_untouched() {
        let store = ChaoticCredentialStore::new(MemoryCredentialStore::new(), 1.0);

        let err = store.set(ACCESS_TOKEN, "t1").expect_err("rate 1 must fail");
        assert!(matches!(err, CredentialError::Io(_)));
        assert!(store.inner().is_empty());
        assert_eq!(store.operation_count(), 1);
    }

    #[test]
    fn same_seed_same_failures() {
        let outcomes = |seed| {
            let store = ChaoticCredentialStore::with_seed(MemoryCredentialStore::new(), 0.5, seed);
            (0..64).map(|_| store.get(ACCESS_TOKEN).is_ok()).collect::<Vec<_>>()
        };

        assert_eq!(outcomes(7), outcomes(7));
        assert!(outcomes(7).contains(&false));
        assert!(outcomes(7).contains(&true));
    }

    #[test]
    fn out_of_range_rate_is_clamped() {
        let store = ChaoticCredentialStore::new(MemoryCredentialStore::new(), 3.0);
        assert!(store.delete(ACCESS_TOKEN).is_err());
    }
}
