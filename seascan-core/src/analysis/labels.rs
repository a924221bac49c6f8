use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_LABEL;

/// Immutable mapping from model class index to label.
///
/// The table is cheap to clone and shared between every candidate decoded
/// with it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelTable {
    labels: Arc<[Arc<str>]>,
}

impl LabelTable {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: labels.into_iter().map(|label| Arc::from(label.as_ref())).collect(),
        }
    }

    /// Number of classes the model scores.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<str>> {
        self.labels.get(idx)
    }

    /// Label for `idx`, falling back to the index itself for classes the
    /// table does not name.
    pub fn name(&self, idx: usize) -> Arc<str> {
        self.get(idx)
            .cloned()
            .unwrap_or_else(|| Arc::from(idx.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.as_ref())
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new([DEFAULT_LABEL])
    }
}

impl fmt::Debug for LabelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl From<Vec<String>> for LabelTable {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<LabelTable> for Vec<String> {
    fn from(table: LabelTable) -> Self {
        table.iter().map(str::to_owned).collect()
    }
}
