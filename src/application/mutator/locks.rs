//! Per-contract lock table
//!
//! Serializes read-modify-write cycles on one contract while letting
//! operations on different contracts run in parallel. The table mutex only
//! guards bookkeeping; it is never held while an operation runs.
//!
//! The table only covers this process. [`ContractLocks::acquire_in`] also
//! takes the gateway's contract lease, which is what keeps separate
//! processes sharing one store apart.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::ports::{ContractLease, StorageGateway};
use crate::domain::value_objects::ContractId;
use crate::error::{PactError, PactResult};

/// Default bounded wait for a contract lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
struct Entry {
    held: bool,
    waiters: usize,
}

/// In-process lock table keyed by contract id
#[derive(Debug)]
pub struct ContractLocks {
    table: Mutex<HashMap<ContractId, Entry>>,
    released: Condvar,
    timeout: Duration,
}

impl Default for ContractLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

impl ContractLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire the lock for `contract`, waiting at most [`Self::timeout`]
    ///
    /// Fails with [`PactError::Busy`] when the wait runs out.
    pub fn acquire(&self, contract: ContractId) -> PactResult<LockGuard<'_>> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut table = self.table();
        let mut waiting = false;

        loop {
            let entry = table.entry(contract).or_default();
            if !entry.held {
                entry.held = true;
                if waiting {
                    entry.waiters -= 1;
                }
                debug!(contract = %contract, "acquired contract lock");
                return Ok(LockGuard {
                    locks: self,
                    contract,
                });
            }
            if !waiting {
                entry.waiters += 1;
                waiting = true;
            }

            let now = Instant::now();
            if now >= deadline {
                entry.waiters -= 1;
                let waited_ms = now.duration_since(started).as_millis() as u64;
                warn!(contract = %contract, waited_ms, "timed out waiting for contract lock");
                return Err(PactError::Busy {
                    contract,
                    waited_ms,
                });
            }

            let (guard, _) = self
                .released
                .wait_timeout(table, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            table = guard;
        }
    }

    /// Acquire `contract` here and in `gateway`, in that order
    ///
    /// Both waits share [`Self::timeout`].
    pub fn acquire_in<G>(
        &self,
        gateway: &G,
        contract: ContractId,
    ) -> PactResult<ContractGuard<'_>>
    where
        G: StorageGateway + ?Sized,
    {
        let started = Instant::now();
        let local = self.acquire(contract)?;
        let remaining = self.timeout.saturating_sub(started.elapsed());
        let lease = gateway
            .lock_contract(contract, remaining)
            .map_err(|err| PactError::from(err).on_contract(contract))?;
        Ok(ContractGuard {
            _lease: lease,
            local,
        })
    }

    /// Number of contracts with a holder or waiters
    pub fn tracked(&self) -> usize {
        self.table().len()
    }

    fn release(&self, contract: ContractId) {
        let mut table = self.table();
        if let Some(entry) = table.get_mut(&contract) {
            entry.held = false;
            if entry.waiters == 0 {
                table.remove(&contract);
            }
        }
        drop(table);
        self.released.notify_all();
        debug!(contract = %contract, "released contract lock");
    }

    // Bookkeeping never panics mid-update, so a poisoned table is still consistent.
    fn table(&self) -> MutexGuard<'_, HashMap<ContractId, Entry>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds a contract lock until dropped
#[derive(Debug)]
pub struct LockGuard<'a> {
    locks: &'a ContractLocks,
    contract: ContractId,
}

impl LockGuard<'_> {
    pub fn contract(&self) -> ContractId {
        self.contract
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(self.contract);
    }
}

/// In-process lock plus the store lease; the lease is released first
#[derive(Debug)]
pub struct ContractGuard<'a> {
    _lease: ContractLease,
    local: LockGuard<'a>,
}

impl ContractGuard<'_> {
    pub fn contract(&self) -> ContractId {
        self.local.contract()
    }
}
