//! Durable storage of the ballot and the notifications that go with it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::ballot;
use crate::catalog::Catalog;
use crate::config::*;
use crate::countdown::Clock;

/// A get/set-by-key string store. Either operation may fail.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, with an optional quota on the number of bytes held
/// (keys and values).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_quota(quota: usize) -> MemoryStore {
        MemoryStore {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk, `{"key": "value", ...}`.
///
/// A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> FileStore {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Unavailable(e.to_string())),
        };
        serde_json::from_str(&contents).map_err(|e| StorageError::Corrupted(e.to_string()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let js = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        fs::write(&self.path, js).map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    // Writes start over when the file cannot be understood.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupted(msg)) => {
                warn!(
                    "FileStore: {}: discarding unreadable content: {}",
                    self.path.display(),
                    msg
                );
                Ok(BTreeMap::new())
            }
            x => x,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Where notices end up. Fire and forget.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice)
    }
}

/// Sends the notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity {
            Severity::Normal => info!("{}: {}", notice.title, notice.description),
            Severity::Destructive => warn!("{}: {}", notice.title, notice.description),
        }
    }
}

/// Keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> RecordingNotifier {
        RecordingNotifier::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

/// The ballot of the local user, tied to its durable storage.
///
/// The submitted ballot is written under `BALLOT_KEY` as a JSON object
/// mapping nomination ids to option labels. The presence of the key is what
/// marks the ballot as submitted.
pub struct VoteStore<S: KeyValueStore, N: Notifier> {
    storage: S,
    notifier: N,
    deadline_lock: Option<(NaiveDateTime, Box<dyn Clock>)>,
}

impl<S: KeyValueStore, N: Notifier> VoteStore<S, N> {
    pub fn new(storage: S, notifier: N) -> VoteStore<S, N> {
        VoteStore {
            storage,
            notifier,
            deadline_lock: None,
        }
    }

    /// Refuses selections and submissions once `clock` reaches `deadline`.
    pub fn with_deadline_lock(mut self, deadline: NaiveDateTime, clock: Box<dyn Clock>) -> Self {
        self.deadline_lock = Some((deadline, clock));
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_closed(&self) -> bool {
        match &self.deadline_lock {
            Some((deadline, clock)) => clock.now() >= *deadline,
            None => false,
        }
    }

    /// Loads the submitted ballot, or an empty one.
    ///
    /// Missing, unreadable or inconsistent data is treated as if nothing had
    /// been stored.
    pub fn restore(&self, catalog: &Catalog) -> BallotState {
        let raw = match self.storage.get(BALLOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("restore: no stored ballot");
                return BallotState::empty();
            }
            Err(e) => {
                warn!("restore: could not read the stored ballot: {}", e);
                return BallotState::empty();
            }
        };
        let selections: BTreeMap<String, String> = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                warn!("restore: ignoring malformed ballot {:?}: {}", raw, e);
                return BallotState::empty();
            }
        };
        let state = BallotState {
            selections,
            submitted: true,
        };
        if !ballot::is_complete(&state, catalog) {
            warn!(
                "restore: ignoring stored ballot that does not match the catalog: {:?}",
                state.selections
            );
            return BallotState::empty();
        }
        info!("restore: found a submitted ballot");
        state
    }

    pub fn select_option(
        &self,
        state: &BallotState,
        catalog: &Catalog,
        nomination_id: &str,
        option: &str,
    ) -> Result<BallotState, BallotError> {
        let res = self
            .check_open(state)
            .and_then(|_| ballot::select_option(state, catalog, nomination_id, option));
        self.report(res)
    }

    /// Freezes and persists a complete ballot.
    ///
    /// A failed write does not undo the submission: the user keeps a
    /// submitted ballot for this session and is told that it was not saved.
    pub fn submit(
        &mut self,
        state: &BallotState,
        catalog: &Catalog,
    ) -> Result<BallotState, BallotError> {
        let submitted = self.report(
            self.check_open(state)
                .and_then(|_| ballot::submit(state, catalog)),
        )?;
        match self.persist(&submitted) {
            Ok(()) => {
                info!(
                    "submit: ballot with {} choices saved",
                    submitted.selections.len()
                );
                self.notifier.notify(&Notice::submitted());
            }
            Err(e) => {
                warn!("submit: the ballot could not be saved: {}", e);
                self.notifier.notify(&Notice::not_persisted());
            }
        }
        Ok(submitted)
    }

    fn persist(&mut self, state: &BallotState) -> Result<(), StorageError> {
        let js = serde_json::to_string(&state.selections)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        self.storage.set(BALLOT_KEY, &js)
    }

    fn check_open(&self, state: &BallotState) -> Result<(), BallotError> {
        // A submitted ballot reports AlreadySubmitted, whatever the time.
        if !state.submitted && self.is_closed() {
            return Err(BallotError::VotingClosed);
        }
        Ok(())
    }

    fn report(&self, res: Result<BallotState, BallotError>) -> Result<BallotState, BallotError> {
        if let Err(e) = &res {
            debug!("rejected: {}", e);
            self.notifier.notify(&e.notice());
        }
        res
    }
}
