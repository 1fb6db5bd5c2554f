//! Constants used throughout the PMS core crate.

/// Default path of the patient store when no explicit file is configured.
pub const DEFAULT_PATIENT_DATA_FILE: &str = "patients.json";

/// Exclusive lower bound for a patient's age.
pub const MIN_AGE_EXCLUSIVE: i64 = 0;

/// Inclusive upper bound for a patient's age.
pub const MAX_AGE: i64 = 120;

/// BMI below this value is classed as underweight.
pub const UNDERWEIGHT_BELOW: f64 = 18.5;

/// Upper bound of the first normal band.
pub const NORMAL_BELOW: f64 = 25.0;

/// BMI at or above this value is classed as obese.
pub const OBESE_FROM: f64 = 30.0;
