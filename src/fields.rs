use std::collections::HashMap;

/// A form field as submitted: once, or repeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Adds another submitted value, turning a single value into a list.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::Single(first) => {
                let first = std::mem::take(first);
                *self = FieldValue::List(vec![first, value]);
            }
            FieldValue::List(values) => values.push(value),
        }
    }

    /// The first value submitted, or an empty string for an empty list.
    pub fn first(&self) -> &str {
        match self {
            FieldValue::Single(value) => value,
            FieldValue::List(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// The scalar fields of a submission, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct RawFields(HashMap<String, FieldValue>);

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one submitted value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        use std::collections::hash_map::Entry;

        match self.0.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value.into()),
            Entry::Vacant(entry) => {
                entry.insert(FieldValue::Single(value.into()));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }
}

/// Coerces an optional field to a single string: the first value of a
/// list, or empty when missing.
///
/// ```
/// use uploader::fields::{coerce, FieldValue};
/// let list = FieldValue::List(vec!["a".into(), "b".into()]);
/// assert_eq!(coerce(Some(&list)), "a");
/// assert_eq!(coerce(None), "");
/// ```
pub fn coerce(value: Option<&FieldValue>) -> String {
    value.map(|v| v.first().to_owned()).unwrap_or_default()
}

/// The metadata fields the sheet row records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadFields {
    pub track: String,
    pub time: String,
}

impl From<&RawFields> for UploadFields {
    fn from(raw: &RawFields) -> Self {
        UploadFields {
            track: coerce(raw.get("track")),
            time: coerce(raw.get("time")),
        }
    }
}
