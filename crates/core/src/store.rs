//! Patient record store.
//!
//! The whole patient collection is read on every operation and, for mutations, written back in
//! full. Storage backends sit behind the [`RecordStore`] trait so the operations never depend on
//! where the collection lives:
//!
//! - [`JsonFileStore`]: a single JSON object on disk, keyed by patient id.
//! - [`InMemoryStore`]: a process-local collection, mostly for tests.
//!
//! ## File Layout
//!
//! ```text
//! {
//!   "P001": { "name": "...", "city": "...", "age": 30, "gender": "male", "height": 1.8, "weight": 72.0 },
//!   "P002": { ... }
//! }
//! ```
//!
//! Derived metrics are never written; they are recomputed from `height` and `weight` on read.

use crate::error::{PatientError, PatientResult};
use crate::patient::StoredPatient;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

// ============================================================================
// PATIENT STORE
// ============================================================================

/// The complete patient collection, in insertion order.
///
/// Ids are unique. Order is the order in which ids were first seen, either in the loaded file or
/// through [`PatientStore::insert`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientStore {
    entries: Vec<(String, StoredPatient)>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StoredPatient> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, patient)| patient)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredPatient)> {
        self.entries
            .iter()
            .map(|(id, patient)| (id.as_str(), patient))
    }

    /// Inserts or replaces the value for `id`.
    ///
    /// A replaced value keeps its original position. Returns the previous value, if any.
    pub fn insert(&mut self, id: String, patient: StoredPatient) -> Option<StoredPatient> {
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some((_, existing)) => Some(std::mem::replace(existing, patient)),
            None => {
                self.entries.push((id, patient));
                None
            }
        }
    }
}

impl FromIterator<(String, StoredPatient)> for PatientStore {
    fn from_iter<I: IntoIterator<Item = (String, StoredPatient)>>(iter: I) -> Self {
        let mut store = PatientStore::new();
        for (id, patient) in iter {
            store.insert(id, patient);
        }
        store
    }
}

impl Serialize for PatientStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, patient) in &self.entries {
            map.serialize_entry(id, patient)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PatientStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = PatientStore;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an object mapping patient ids to patient records")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut store = PatientStore::new();
                while let Some((id, patient)) = access.next_entry::<String, StoredPatient>()? {
                    store.insert(id, patient);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}

// ============================================================================
// STORAGE BACKENDS
// ============================================================================

/// Loads and persists the complete patient collection.
pub trait RecordStore: Send + Sync {
    /// Reads the entire collection.
    ///
    /// # Errors
    ///
    /// - [`PatientError::StorageUnavailable`] if the backing storage is missing or unreadable.
    /// - [`PatientError::MalformedData`] if its contents are not a valid patient collection.
    fn load(&self) -> PatientResult<PatientStore>;

    /// Replaces the entire collection.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageUnavailable`] if the write fails. The previously persisted
    /// collection is left in place in that case.
    fn save(&self, store: &PatientStore) -> PatientResult<()>;
}

/// A patient collection kept in a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty collection file if none exists yet.
    ///
    /// Returns `true` if a file was created and `false` if one was already present. An existing
    /// file is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageUnavailable`] if the file cannot be created.
    pub fn initialise(&self) -> PatientResult<bool> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(PatientError::StorageUnavailable(e)),
        };
        file.write_all(b"{}\n")
            .map_err(PatientError::StorageUnavailable)?;
        tracing::info!("created empty patient store at {}", self.path.display());
        Ok(true)
    }

    /// Writes a replacement file beside the target and renames it over the target, so readers
    /// never see a partial file. If `write` or any later step fails, the target is untouched and
    /// the temporary file is removed.
    fn replace_contents<F>(&self, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let mut tmp = tempfile::NamedTempFile::new_in(self.parent_dir())?;
        write(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> PatientResult<PatientStore> {
        let contents = fs::read_to_string(&self.path).map_err(PatientError::StorageUnavailable)?;
        let store: PatientStore =
            serde_json::from_str(&contents).map_err(PatientError::MalformedData)?;
        tracing::debug!(
            "loaded {} patients from {}",
            store.len(),
            self.path.display()
        );
        Ok(store)
    }

    fn save(&self, store: &PatientStore) -> PatientResult<()> {
        let json = serde_json::to_string_pretty(store).map_err(PatientError::Serialization)?;

        self.replace_contents(|file| file.write_all(json.as_bytes()))
            .map_err(PatientError::StorageUnavailable)?;

        tracing::debug!("saved {} patients to {}", store.len(), self.path.display());
        Ok(())
    }
}

/// A patient collection held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<PatientStore>,
}

impl InMemoryStore {
    pub fn new(store: PatientStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self) -> PatientResult<PatientStore> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, store: &PatientStore) -> PatientResult<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = store.clone();
        Ok(())
    }
}
