//! Patient data model and derived health metrics.
//!
//! Three shapes of a patient exist:
//!
//! - [`PatientFields`]: raw, unvalidated input as it arrives from an API or CLI caller.
//! - [`NewPatient`]: the result of [`PatientFields::validate`], guaranteed to satisfy every field
//!   constraint.
//! - [`StoredPatient`]: the value persisted under a patient id. It never carries the id itself
//!   nor the derived `bmi`/`verdict`, which are recomputed whenever a [`PatientView`] is built.

use crate::constants::{MAX_AGE, MIN_AGE_EXCLUSIVE, NORMAL_BELOW, OBESE_FROM, UNDERWEIGHT_BELOW};
use crate::text::NonEmptyText;
use crate::{PatientError, PatientResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALLOWED: [&'static str; 2] = ["male", "female"];

    /// Parses the lowercase wire form. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health classification derived from a BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Verdict {
    Underweight,
    Normal,
    Obese,
}

/// Body mass index: `weight / height²`, rounded to two decimal places.
///
/// `height` must be greater than zero. Extreme inputs can still overflow to infinity, so
/// validation rejects any [`NewPatient`] whose BMI is not finite and [`StoredPatient::bmi`]
/// drops such values for records read back from disk.
pub fn compute_bmi(height: f64, weight: f64) -> f64 {
    let bmi = weight / (height * height);
    (bmi * 100.0).round() / 100.0
}

/// Classifies a BMI value.
#[allow(clippy::if_same_then_else)]
pub fn compute_verdict(bmi: f64) -> Verdict {
    if bmi < UNDERWEIGHT_BELOW {
        Verdict::Underweight
    } else if bmi < NORMAL_BELOW {
        Verdict::Normal
    } else if bmi < OBESE_FROM {
        // 25.0..30.0 also reports Normal; there is no overweight band.
        Verdict::Normal
    } else {
        Verdict::Obese
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// A single field constraint that input failed to meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// Every constraint violated by one set of [`PatientFields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Whether `field` has at least one violation.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

/// One field of unvalidated input, kept even when its JSON type is wrong.
///
/// A mistyped value is reported by [`PatientFields::validate`] alongside every other violation
/// instead of failing deserialisation of the whole body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue<T> {
    Valid(T),
    Mistyped(serde_json::Value),
}

impl<T> From<T> for FieldValue<T> {
    fn from(value: T) -> Self {
        FieldValue::Valid(value)
    }
}

impl From<&str> for FieldValue<String> {
    fn from(value: &str) -> Self {
        FieldValue::Valid(value.to_string())
    }
}

/// Unvalidated patient input.
///
/// Every field is optional at this stage so that a missing field can be reported alongside any
/// other violation instead of aborting deserialisation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatientFields {
    #[schema(value_type = Option<String>, example = "P001")]
    pub id: Option<FieldValue<String>>,
    #[schema(value_type = Option<String>, example = "Anish Gupta")]
    pub name: Option<FieldValue<String>>,
    #[schema(value_type = Option<String>, example = "Mumbai")]
    pub city: Option<FieldValue<String>>,
    #[schema(value_type = Option<i64>, example = 25)]
    pub age: Option<FieldValue<i64>>,
    #[schema(value_type = Option<String>, example = "male")]
    pub gender: Option<FieldValue<String>>,
    /// Height in metres.
    #[schema(value_type = Option<f64>, example = 1.75)]
    pub height: Option<FieldValue<f64>>,
    /// Weight in kilograms.
    #[schema(value_type = Option<f64>, example = 70.0)]
    pub weight: Option<FieldValue<f64>>,
}

impl PatientFields {
    /// Checks every field and returns a validated patient.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Validation`] listing all violated constraints, not just the
    /// first one found.
    pub fn validate(self) -> PatientResult<NewPatient> {
        let mut violations = Violations::default();

        let id = required_text(&mut violations, "id", self.id);
        let name = required_text(&mut violations, "name", self.name);
        let city = required_text(&mut violations, "city", self.city);

        let age_range = format!("must be greater than {MIN_AGE_EXCLUSIVE} and at most {MAX_AGE}");
        let age = match self.age {
            // Integers beyond i64 are still integers, just out of range.
            Some(FieldValue::Mistyped(serde_json::Value::Number(n))) if n.is_u64() => {
                violations.push("age", age_range);
                None
            }
            age => match required(&mut violations, "age", age, "an integer") {
                Some(age) if age > MIN_AGE_EXCLUSIVE && age <= MAX_AGE => u32::try_from(age).ok(),
                Some(_) => {
                    violations.push("age", age_range);
                    None
                }
                None => None,
            },
        };
        let gender = match required(&mut violations, "gender", self.gender, "a string") {
            Some(value) => {
                let parsed = Gender::parse(&value);
                if parsed.is_none() {
                    violations.push(
                        "gender",
                        format!("must be one of {}", Gender::ALLOWED.join(", ")),
                    );
                }
                parsed
            }
            None => None,
        };
        let height = positive(&mut violations, "height", self.height);
        let weight = positive(&mut violations, "weight", self.weight);
        if let (Some(height), Some(weight)) = (height, weight) {
            if !compute_bmi(height, weight).is_finite() {
                let message = "height and weight must give a finite BMI";
                violations.push("height", message);
                violations.push("weight", message);
            }
        }

        match (id, name, city, age, gender, height, weight) {
            (
                Some(id),
                Some(name),
                Some(city),
                Some(age),
                Some(gender),
                Some(height),
                Some(weight),
            ) if violations.is_empty() => Ok(NewPatient {
                id,
                name,
                city,
                age,
                gender,
                height,
                weight,
            }),
            _ => Err(PatientError::Validation(violations)),
        }
    }
}

fn required<T>(
    violations: &mut Violations,
    field: &str,
    value: Option<FieldValue<T>>,
    expected: &str,
) -> Option<T> {
    match value {
        None => {
            violations.push(field, "field required");
            None
        }
        Some(FieldValue::Valid(value)) => Some(value),
        Some(FieldValue::Mistyped(_)) => {
            violations.push(field, format!("must be {expected}"));
            None
        }
    }
}

fn required_text(
    violations: &mut Violations,
    field: &str,
    value: Option<FieldValue<String>>,
) -> Option<NonEmptyText> {
    let value = required(violations, field, value, "a string")?;
    match NonEmptyText::new(value) {
        Ok(text) => Some(text),
        Err(e) => {
            violations.push(field, e.to_string());
            None
        }
    }
}

fn positive(
    violations: &mut Violations,
    field: &str,
    value: Option<FieldValue<f64>>,
) -> Option<f64> {
    match required(violations, field, value, "a number")? {
        v if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            violations.push(field, "must be greater than 0");
            None
        }
    }
}

// ============================================================================
// VALIDATED AND STORED FORMS
// ============================================================================

/// A patient whose fields satisfy every constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    id: NonEmptyText,
    name: NonEmptyText,
    city: NonEmptyText,
    age: u32,
    gender: Gender,
    height: f64,
    weight: f64,
}

impl NewPatient {
    pub fn id(&self) -> &NonEmptyText {
        &self.id
    }

    pub fn bmi(&self) -> f64 {
        compute_bmi(self.height, self.weight)
    }

    pub fn verdict(&self) -> Verdict {
        compute_verdict(self.bmi())
    }

    /// Splits the patient into its store key and the value persisted under it.
    pub fn into_entry(self) -> (String, StoredPatient) {
        (
            self.id.into_inner(),
            StoredPatient {
                name: self.name.into_inner(),
                city: self.city.into_inner(),
                age: self.age,
                gender: self.gender,
                height: self.height,
                weight: self.weight,
            },
        )
    }
}

/// The value persisted for one patient, keyed externally by the patient id.
///
/// A missing `height` or `weight` loads as `0`, which leaves the record without a derived BMI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredPatient {
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub weight: f64,
}

impl StoredPatient {
    /// BMI of the stored measurements, or `None` when they cannot produce one.
    pub fn bmi(&self) -> Option<f64> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        (usable(self.height) && usable(self.weight))
            .then(|| compute_bmi(self.height, self.weight))
            .filter(|bmi| bmi.is_finite())
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.bmi().map(compute_verdict)
    }

    /// The record with its derived metrics attached.
    pub fn view(&self) -> PatientView {
        PatientView {
            record: self.clone(),
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
    }
}

/// A stored patient together with its freshly computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatientView {
    #[serde(flatten)]
    pub record: StoredPatient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

/// A [`PatientView`] paired with its id, used for ordered listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatientEntry {
    pub id: String,
    #[serde(flatten)]
    pub patient: PatientView,
}
