//! Raw classifier labels and their human-readable categories.

use std::collections::HashMap;

/// Category names keyed by the classifier's raw label.
const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("LABEL_0", "Course Registration"),
    ("LABEL_1", "Documents & Certificates"),
    ("LABEL_2", "General Inquiry"),
    ("LABEL_3", "Payment & Fees"),
    ("LABEL_4", "Scheduling & Attendance"),
];

/// Immutable raw-label → category table.
#[derive(Debug, Clone)]
pub struct LabelMap {
    categories: HashMap<String, String>,
}

impl LabelMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            categories: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Map a raw label to its category. Unknown labels map to themselves.
    pub fn map_label<'a>(&'a self, raw_label: &'a str) -> &'a str {
        self.categories
            .get(raw_label)
            .map(String::as_str)
            .unwrap_or(raw_label)
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().copied())
    }
}
