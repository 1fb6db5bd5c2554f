//! Adding a patient to a loaded [`PatientStore`].

use crate::error::{PatientError, PatientResult};
use crate::patient::NewPatient;
use crate::store::PatientStore;

/// Returns `store` with `patient` appended.
///
/// The patient id becomes the store key and is not repeated inside the stored value. Nothing is
/// persisted here; callers hand the returned store to [`RecordStore::save`].
///
/// [`RecordStore::save`]: crate::store::RecordStore::save
///
/// # Errors
///
/// Returns [`PatientError::AlreadyExists`] if the id is already a key. The input store is never
/// modified.
pub fn create(store: &PatientStore, patient: NewPatient) -> PatientResult<PatientStore> {
    if store.contains(patient.id().as_str()) {
        return Err(PatientError::AlreadyExists(patient.id().to_string()));
    }

    let mut updated = store.clone();
    let (id, stored) = patient.into_entry();
    updated.insert(id, stored);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientFields;

    fn new_patient(id: &str, weight: f64) -> NewPatient {
        PatientFields {
            id: Some(id.into()),
            name: Some("A".into()),
            city: Some("X".into()),
            age: Some(30.into()),
            gender: Some("male".into()),
            height: Some(1.8.into()),
            weight: Some(weight.into()),
        }
        .validate()
        .expect("fields should validate")
    }

    #[test]
    fn test_create_appends_record() {
        let store = PatientStore::new();
        let updated = create(&store, new_patient("P001", 72.0)).expect("create should succeed");

        assert!(store.is_empty(), "input store is not modified");
        assert_eq!(updated.len(), 1);
        let stored = updated.get("P001").expect("record should be stored");
        assert_eq!(stored.name, "A");
        assert_eq!(stored.bmi(), Some(22.22));
    }

    #[test]
    fn test_create_keeps_insertion_order() {
        let store = create(&PatientStore::new(), new_patient("P002", 60.0)).unwrap();
        let store = create(&store, new_patient("P001", 70.0)).unwrap();

        let ids: Vec<&str> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["P002", "P001"]);
    }

    #[test]
    fn test_create_duplicate_id_fails_and_leaves_store_unchanged() {
        let store = create(&PatientStore::new(), new_patient("P001", 72.0)).unwrap();
        let before = store.clone();

        let err = create(&store, new_patient("P001", 99.0)).expect_err("duplicate should fail");

        assert!(matches!(err, PatientError::AlreadyExists(id) if id == "P001"));
        assert_eq!(store, before);
        assert_eq!(store.get("P001").unwrap().weight, 72.0);
    }

    #[test]
    fn test_create_keys_padded_id_as_given() {
        let store = create(&PatientStore::new(), new_patient("P001", 72.0)).unwrap();
        let store = create(&store, new_patient(" P001 ", 60.0)).expect("distinct id");

        assert_eq!(store.get("P001").unwrap().weight, 72.0);
        assert_eq!(store.get(" P001 ").unwrap().weight, 60.0);
    }
}
