//! The set of JSON keys treated as sensitive, and the marker keys the guard writes.

/// Suffix of the companion flag written next to every encrypted field.
pub const ENCRYPTED_SUFFIX: &str = "_encrypted";

/// Top-level key that marks a payload as already processed.
pub const PROCESSED_MARKER: &str = "_encrypted";

/// Field names encrypted when `SENSITIVE_FIELDS` is not configured.
pub const DEFAULT_SENSITIVE_FIELDS: &[&str] = &[
    "medicalHistory",
    "diagnosis",
    "allergies",
    "currentMedications",
    "idNumber",
    "phoneNumber",
    "email",
    "address",
    "emergencyContact",
    "insuranceNumber",
];

/// Name of the companion flag for `field`, e.g. `diagnosis_encrypted`.
pub fn flag_name(field: &str) -> String {
    format!("{field}{ENCRYPTED_SUFFIX}")
}

/// Ordered, de-duplicated set of sensitive field names.
///
/// Matching is by exact key only; values are never inspected to decide
/// whether a field is sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensitiveFields(Vec<String>);

impl SensitiveFields {
    /// Build a set from names, trimming whitespace and dropping blanks and
    /// duplicates. First occurrence wins.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !out.iter().any(|n| n == name) {
                out.push(name.to_owned());
            }
        }
        Self(out)
    }

    /// The built-in clinic field list.
    pub fn clinic_defaults() -> Self {
        Self::new(DEFAULT_SENSITIVE_FIELDS)
    }

    /// Parse a comma-separated list such as `"diagnosis, idNumber"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
