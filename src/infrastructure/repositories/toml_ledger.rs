//! TOML Ledger Gateway
//!
//! Persists contracts and milestones in a single TOML file (default
//! `<data_dir>/pactline/ledger.toml`).
//!
//! Reads take a shared `fs2` lock on a sibling `.lock` file and writes take
//! an exclusive one, so several processes can share a ledger. Every write is
//! a full read-modify-write of the file, replaced atomically via a temp file
//! in the same directory.
//!
//! Contract leases are exclusive `fs2` locks on one file per contract under
//! `<ledger>.locks/`. A lease is always taken before the ledger lock and
//! never while holding it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::entities::{ContractRecord, Milestone};
use crate::domain::ports::{
    ChangeSet, ContractLease, StorageError, StorageGateway, StorageResult,
};
use crate::domain::value_objects::{ContractId, MilestoneId};

use super::ledger::{Ledger, LedgerFile, LEDGER_VERSION};

const LEASE_POLL_MIN: Duration = Duration::from_millis(2);
const LEASE_POLL_MAX: Duration = Duration::from_millis(50);

pub struct TomlLedgerGateway {
    path: PathBuf,
}

impl TomlLedgerGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn contract_lock_path(&self, contract: ContractId) -> PathBuf {
        self.path
            .with_extension("locks")
            .join(format!("contract-{}.lock", contract))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn open_lock_file(&self, lock_path: &Path) -> StorageResult<fs::File> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }
        fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)
            .map_err(|e| self.io_error(lock_path, e))
    }

    /// Run `f` against the current ledger under a shared lock
    fn with_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> StorageResult<T> {
        let lock_file = self.open_lock_file(&self.lock_path())?;
        lock_file
            .lock_shared()
            .map_err(|e| self.io_error(&self.lock_path(), e))?;

        let result = self.load_from_disk().map(|ledger| f(&ledger));

        let _ = lock_file.unlock();
        result
    }

    /// Load, modify and save the ledger under an exclusive lock
    ///
    /// Nothing is written if `f` leaves the ledger unchanged.
    fn update<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> StorageResult<T> {
        let lock_file = self.open_lock_file(&self.lock_path())?;
        lock_file
            .lock_exclusive()
            .map_err(|e| self.io_error(&self.lock_path(), e))?;

        let result = self.load_from_disk().and_then(|before| {
            let mut ledger = before.clone();
            let value = f(&mut ledger);
            if ledger != before {
                self.save_to_disk(&ledger)?;
            }
            Ok(value)
        });

        let _ = lock_file.unlock();
        result
    }

    fn load_from_disk(&self) -> StorageResult<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| self.io_error(&self.path, e))?;
        let file: LedgerFile = toml::from_str(&content).map_err(|e| StorageError::Corrupted {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if file.version != LEDGER_VERSION {
            return Err(StorageError::VersionMismatch {
                found: file.version,
                expected: LEDGER_VERSION,
            });
        }
        Ok(Ledger::from(file))
    }

    fn save_to_disk(&self, ledger: &Ledger) -> StorageResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| self.io_error(&parent, e))?;

        let content = toml::to_string_pretty(&LedgerFile::from(ledger))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| self.io_error(&parent, e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| self.io_error(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| self.io_error(&self.path, e.error))?;

        debug!(path = %self.path.display(), "saved ledger");
        Ok(())
    }
}

impl StorageGateway for TomlLedgerGateway {
    fn get_contract(&self, id: ContractId) -> StorageResult<Option<ContractRecord>> {
        self.with_ledger(|ledger| ledger.contract(id))
    }

    fn get_milestones(&self, contract: ContractId) -> StorageResult<Vec<Milestone>> {
        self.with_ledger(|ledger| ledger.milestones_of(contract))
    }

    fn get_milestone(&self, id: MilestoneId) -> StorageResult<Option<Milestone>> {
        self.with_ledger(|ledger| ledger.milestone(id))
    }

    fn put_contract(&self, record: &ContractRecord) -> StorageResult<()> {
        self.update(|ledger| ledger.put_contract(record.clone()))
    }

    fn put_milestone(&self, milestone: &Milestone) -> StorageResult<()> {
        self.update(|ledger| ledger.put_milestone(milestone.clone()))
    }

    fn delete_milestone(&self, id: MilestoneId) -> StorageResult<bool> {
        self.update(|ledger| ledger.remove_milestone(id))
    }

    fn list_contracts(&self) -> StorageResult<Vec<ContractRecord>> {
        self.with_ledger(Ledger::contracts)
    }

    fn delete_contract(&self, id: ContractId) -> StorageResult<bool> {
        self.update(|ledger| ledger.remove_contract(id))
    }

    fn next_contract_id(&self) -> StorageResult<ContractId> {
        self.update(Ledger::allocate_contract_id)
    }

    fn next_milestone_id(&self) -> StorageResult<MilestoneId> {
        self.update(Ledger::allocate_milestone_id)
    }

    /// Poll for the contract's lock file until `timeout` runs out
    fn lock_contract(
        &self,
        contract: ContractId,
        timeout: Duration,
    ) -> StorageResult<ContractLease> {
        let path = self.contract_lock_path(contract);
        let file = self.open_lock_file(&path)?;
        let contended = fs2::lock_contended_error().kind();
        let started = Instant::now();
        let mut pause = LEASE_POLL_MIN;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(contract = %contract, path = %path.display(), "acquired contract lease");
                    return Ok(ContractLease::hold(LeaseFile { file }));
                }
                Err(err) if err.kind() == contended => {}
                Err(err) => return Err(self.io_error(&path, err)),
            }

            let waited = started.elapsed();
            if waited >= timeout {
                let waited_ms = waited.as_millis() as u64;
                warn!(contract = %contract, waited_ms, "timed out waiting for contract lease");
                return Err(StorageError::LockTimeout {
                    contract,
                    waited_ms,
                });
            }
            thread::sleep(pause.min(timeout - waited));
            pause = (pause * 2).min(LEASE_POLL_MAX);
        }
    }

    /// The whole change set lands in one file replacement
    fn commit(&self, changes: &ChangeSet) -> StorageResult<()> {
        self.update(|ledger| ledger.apply(changes))
    }
}

/// Locked contract file, unlocked on drop
struct LeaseFile {
    file: fs::File,
}

impl Drop for LeaseFile {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
