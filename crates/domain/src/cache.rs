use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::error::DomainError;
use crate::DomainResult;

/// Short-TTL single-flight cache for one expensive payload.
///
/// A hit returns immediately. Concurrent misses collapse into one
/// computation: losers wait on the flight lock and re-read the slot once the
/// winner has published. Waiting is bounded; a caller that outlives
/// `lock_wait` fails with `CacheTimeout` instead of blocking the request.
pub struct SingleFlightCache<T> {
    ttl: Duration,
    lock_wait: Duration,
    slot: Mutex<Option<Entry<T>>>,
    flight: tokio::sync::Mutex<()>,
}

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> SingleFlightCache<T> {
    pub fn new(ttl: Duration, lock_wait: Duration) -> Self {
        Self {
            ttl,
            lock_wait,
            slot: Mutex::new(None),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn get_or_compute<F, Fut>(&self, compute: F) -> DomainResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        if let Some(value) = self.fresh() {
            return Ok(value);
        }

        let _flight = timeout(self.lock_wait, self.flight.lock())
            .await
            .map_err(|_| DomainError::CacheTimeout)?;

        // Double-checked: the winner may have published while we waited.
        if let Some(value) = self.fresh() {
            return Ok(value);
        }

        let value = compute().await?;
        *self.slot.lock().expect("cache slot lock") = Some(Entry {
            value: value.clone(),
            stored_at: Instant::now(),
        });
        Ok(value)
    }

    pub fn invalidate(&self) {
        *self.slot.lock().expect("cache slot lock") = None;
    }

    fn fresh(&self) -> Option<T> {
        let guard = self.slot.lock().expect("cache slot lock");
        guard
            .as_ref()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }
}
