//! Readiness gate between the decoder thread and the agent cycle.
//!
//! The decoder publishes one batch per cycle; the agent waits for "a batch
//! for cycle N" with a bounded timeout and carries on with decayed state if
//! none shows up in time.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::warn;

use super::ObservationBatch;

#[derive(Debug, Default)]
struct Slot {
    latest: Option<ObservationBatch>,
}

#[derive(Debug, Default)]
pub struct SightGate {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl SightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder side. A batch older than the one already waiting is dropped.
    pub fn publish(&self, batch: ObservationBatch) {
        let mut slot = self.lock();
        let stale = slot.latest.as_ref().is_some_and(|cur| cur.cycle > batch.cycle);
        if !stale {
            slot.latest = Some(batch);
        }
        drop(slot);
        self.ready.notify_all();
    }

    /// Take the waiting batch if it is for `cycle` or later, without blocking.
    pub fn try_take(&self, cycle: u64) -> Option<ObservationBatch> {
        let mut slot = self.lock();
        take_if_ready(&mut slot, cycle)
    }

    /// Block until a batch for `cycle` (or later) is published or `timeout`
    /// elapses. `None` means the cycle proceeds without fresh data.
    pub fn wait_for(&self, cycle: u64, timeout: Duration) -> Option<ObservationBatch> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.lock();
        loop {
            if let Some(batch) = take_if_ready(&mut slot, cycle) {
                return Some(batch);
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(cycle, "no observation before cycle deadline");
                return None;
            }
            slot = match self.ready.wait_timeout(slot, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => {
                    warn!(cycle, "sight gate lock poisoned; recovering");
                    poisoned.into_inner().0
                }
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("sight gate lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}

fn take_if_ready(slot: &mut Slot, cycle: u64) -> Option<ObservationBatch> {
    if slot.latest.as_ref().is_some_and(|b| b.cycle >= cycle) {
        slot.latest.take()
    } else {
        None
    }
}
