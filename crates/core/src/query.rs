//! Read-only operations over a loaded [`PatientStore`].

use crate::error::{PatientError, PatientResult};
use crate::patient::{PatientEntry, PatientView, StoredPatient};
use crate::store::PatientStore;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// A field that patients can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALLOWED: [&'static str; 3] = ["height", "weight", "bmi"];

    /// Sort key for `patient`. Values that are absent or cannot be derived order as `0`.
    fn key(&self, patient: &StoredPatient) -> f64 {
        match self {
            SortField::Height => patient.height,
            SortField::Weight => patient.weight,
            SortField::Bmi => patient.bmi().unwrap_or(0.0),
        }
    }
}

impl FromStr for SortField {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            other => Err(PatientError::InvalidArgument(format!(
                "invalid sort field '{other}', select from [{}]",
                SortField::ALLOWED.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALLOWED: [&'static str; 2] = ["asc", "desc"];
}

impl FromStr for SortOrder {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(PatientError::InvalidArgument(format!(
                "invalid sort order '{other}', select between [{}]",
                SortOrder::ALLOWED.join(", ")
            ))),
        }
    }
}

/// Looks up one patient by exact id.
///
/// # Errors
///
/// Returns [`PatientError::NotFound`] if `id` is not a key of the store.
pub fn get_by_id(store: &PatientStore, id: &str) -> PatientResult<PatientView> {
    store
        .get(id)
        .map(StoredPatient::view)
        .ok_or_else(|| PatientError::NotFound(id.to_string()))
}

/// Every patient with derived metrics, keyed by id.
///
/// Serialises as a single JSON object in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientViews(Vec<PatientEntry>);

impl PatientViews {
    pub fn entries(&self) -> &[PatientEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PatientViews {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.id, &entry.patient)?;
        }
        map.end()
    }
}

/// Every patient with derived metrics, in store order.
pub fn view_all(store: &PatientStore) -> PatientViews {
    PatientViews(store.iter().map(|(id, patient)| entry(id, patient)).collect())
}

/// Patients ordered by `field`.
///
/// The sort is stable in both directions: patients with equal keys keep their store order, so a
/// descending sort is the ascending sort reversed except among ties.
pub fn sort_by(store: &PatientStore, field: SortField, order: SortOrder) -> Vec<PatientEntry> {
    let mut patients: Vec<(&str, &StoredPatient)> = store.iter().collect();

    // `sort_by` on slices is stable.
    patients.sort_by(|(_, a), (_, b)| {
        let ordering = field.key(a).total_cmp(&field.key(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    patients
        .into_iter()
        .map(|(id, patient)| entry(id, patient))
        .collect()
}

/// Parses raw query parameters and sorts.
///
/// `order` defaults to ascending when omitted.
///
/// # Errors
///
/// Returns [`PatientError::InvalidArgument`] if `field` is missing or either value is outside
/// its allowed set.
pub fn sort_by_params(
    store: &PatientStore,
    field: Option<&str>,
    order: Option<&str>,
) -> PatientResult<Vec<PatientEntry>> {
    let (field, order) = parse_sort_params(field, order)?;
    Ok(sort_by(store, field, order))
}

/// Validates raw sort parameters without touching any store.
pub fn parse_sort_params(
    field: Option<&str>,
    order: Option<&str>,
) -> PatientResult<(SortField, SortOrder)> {
    let field = field.ok_or_else(|| {
        PatientError::InvalidArgument(format!(
            "sort field is required, select from [{}]",
            SortField::ALLOWED.join(", ")
        ))
    })?;
    let field = field.parse::<SortField>()?;
    let order = order
        .map(str::parse::<SortOrder>)
        .transpose()?
        .unwrap_or_default();
    Ok((field, order))
}

fn entry(id: &str, patient: &StoredPatient) -> PatientEntry {
    PatientEntry {
        id: id.to_string(),
        patient: patient.view(),
    }
}
