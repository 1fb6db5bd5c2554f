//! Patient service.
//!
//! Wraps a [`RecordStore`] with the load → operate → save sequence every operation follows. The
//! REST API and CLI both go through this type.

use crate::create;
use crate::error::PatientResult;
use crate::patient::{NewPatient, PatientEntry, PatientFields, PatientView};
use crate::query::{self, PatientViews, SortField, SortOrder};
use crate::store::{JsonFileStore, RecordStore};
use crate::CoreConfig;
use std::sync::{Arc, Mutex, PoisonError};

/// Pure patient data operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn RecordStore>,
    // Serialises load-modify-save so concurrent creates in this process cannot lose updates.
    write_lock: Arc<Mutex<()>>,
}

impl PatientService {
    /// Creates a service over any record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a service over the JSON file named in `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(Arc::new(JsonFileStore::new(cfg.patient_data_file())))
    }

    /// Every patient keyed by id, with derived metrics.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be loaded.
    pub fn view_all(&self) -> PatientResult<PatientViews> {
        let store = self.store.load()?;
        Ok(query::view_all(&store))
    }

    /// One patient by id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` for an unknown id, or a storage error.
    pub fn get(&self, id: &str) -> PatientResult<PatientView> {
        let store = self.store.load()?;
        query::get_by_id(&store, id)
    }

    /// All patients ordered by `field`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be loaded.
    pub fn sorted(&self, field: SortField, order: SortOrder) -> PatientResult<Vec<PatientEntry>> {
        let store = self.store.load()?;
        Ok(query::sort_by(&store, field, order))
    }

    /// Validates `fields` and persists the new patient.
    ///
    /// Validation runs before the store is touched, so invalid input never causes I/O.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - any field violates its constraint (`Validation`, listing every violation),
    /// - the id is already present (`AlreadyExists`),
    /// - the store cannot be loaded or saved.
    pub fn create(&self, fields: PatientFields) -> PatientResult<PatientView> {
        let patient = fields.validate()?;
        self.create_validated(patient)
    }

    /// Persists an already validated patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::AlreadyExists` for a duplicate id, or a storage error.
    pub fn create_validated(&self, patient: NewPatient) -> PatientResult<PatientView> {
        let id = patient.id().to_string();

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let store = self.store.load()?;
        let updated = create::create(&store, patient)?;
        self.store.save(&updated)?;

        tracing::info!("created patient {}", id);
        query::get_by_id(&updated, &id)
    }
}
