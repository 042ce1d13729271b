use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One license class offered by the API, with the questions that select
/// its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub id: String,
    pub label: String,
    pub fields: Vec<LicenseField>,
}

/// A multiple-choice question ("Allow commercial uses?") of a license class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseField {
    pub id: String,
    pub label: String,
    pub description: String,
    pub options: Vec<LicenseFieldOption>,
}

/// One selectable answer of a [`LicenseField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseFieldOption {
    pub id: String,
    pub label: String,
    pub description: String,
}

/// Answers keyed by field identifier, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet(IndexMap<String, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `field`. An existing answer is replaced in place,
    /// keeping its original position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut answers = AnswerSet::new();
        for (k, v) in iter {
            answers.insert(k, v);
        }
        answers
    }
}

impl std::fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// Result of fetching every license class for a locale.
///
/// `failed` lists the identifiers whose detail request or parse failed, so a
/// partial catalog is distinguishable from a complete one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub licenses: Vec<LicenseSummary>,
    pub failed: Vec<String>,
}

impl Catalog {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
