//! # PMS Core
//!
//! Core business logic for the PMS patient management system.
//!
//! This crate contains pure data operations over a flat patient store:
//! - The patient model, its validation and derived health metrics (BMI and verdict)
//! - Loading and saving the whole collection through a [`RecordStore`]
//! - Lookup by id, ordering by measurement, and creation of new patients
//!
//! **No API concerns**: HTTP servers, routing and request parsing belong in `api-rest`; command
//! parsing belongs in `pms-cli`.

pub mod config;
pub mod constants;
pub mod create;
pub mod error;
pub mod patient;
pub mod patient_service;
pub mod query;
pub mod store;
pub mod text;

pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_FILE;
pub use error::{PatientError, PatientResult};
pub use patient::{
    compute_bmi, compute_verdict, FieldValue, Gender, NewPatient, PatientEntry, PatientFields, PatientView,
    StoredPatient, Verdict, Violation, Violations,
};
pub use patient_service::PatientService;
pub use query::{PatientViews, SortField, SortOrder};
pub use store::{InMemoryStore, JsonFileStore, PatientStore, RecordStore};
pub use text::{NonEmptyText, TextError};
