//! Diagnostics collected while loading and exporting configuration.

use errors::SourceError;

/// Failures that were suppressed during a best-effort operation.
///
/// Nothing in this crate escalates these; inspecting the report is opt-in.
#[derive(Debug, Default)]
pub struct Report {
    diagnostics: Vec<SourceError>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SourceError) {
        self.diagnostics.push(error);
    }

    pub fn extend(&mut self, other: Report) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceError> {
        self.diagnostics.iter()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn into_diagnostics(self) -> Vec<SourceError> {
        self.diagnostics
    }
}

impl From<SourceError> for Report {
    fn from(error: SourceError) -> Self {
        Self {
            diagnostics: vec![error],
        }
    }
}
