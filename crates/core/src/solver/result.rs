//! Outcome of a grid pass

use crate::error::ColumnError;

/// How one active column fared
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStatus {
    Success,
    Failed(ColumnError),
}

/// Status of the column at `index`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutcome {
    pub index: usize,
    pub status: ColumnStatus,
}

impl ColumnOutcome {
    #[inline]
    pub fn success(index: usize) -> Self {
        Self {
            index,
            status: ColumnStatus::Success,
        }
    }

    #[inline]
    pub fn failed(index: usize, error: ColumnError) -> Self {
        Self {
            index,
            status: ColumnStatus::Failed(error),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ColumnStatus::Success)
    }

    pub fn error(&self) -> Option<&ColumnError> {
        match &self.status {
            ColumnStatus::Success => None,
            ColumnStatus::Failed(error) => Some(error),
        }
    }
}

/// Per-column outcomes of one pass, in ascending column order
///
/// Inactive columns do not appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    outcomes: Vec<ColumnOutcome>,
}

impl StepResult {
    pub(crate) fn new(mut outcomes: Vec<ColumnOutcome>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.index);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ColumnOutcome] {
        &self.outcomes
    }

    /// Number of columns that took part in the pass
    pub fn active_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.active_count() - self.success_count()
    }

    /// Indices of failed columns, ascending
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures().map(|(index, _)| index).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &ColumnError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|error| (o.index, error)))
    }

    /// True when every active column succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ColumnOutcome::is_success)
    }

    /// Outcome for `index`, or `None` if the column was inactive
    pub fn outcome(&self, index: usize) -> Option<&ColumnOutcome> {
        self.outcomes
            .binary_search_by_key(&index, |o| o.index)
            .ok()
            .map(|position| &self.outcomes[position])
    }
}
