//! Batch outcome types.

use crate::failures::ItemFailure;

/// Outcome of one batch run.
///
/// `outputs` holds successful results in input order; items that exhausted
/// their attempts are filtered out and recorded in `failures` instead. A
/// report with non-empty `failures` is a degraded success: the batch ran to
/// the end, some items did not make it. A batch that could not run to the
/// end returns [`ExecutorError`](crate::executor::ExecutorError) instead of
/// a report.
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    /// Successful outputs, ordered by input position.
    pub outputs: Vec<T>,
    /// Items that exhausted their attempts, ordered by input position.
    pub failures: Vec<ItemFailure>,
    /// Number of items submitted.
    pub total: usize,
}

impl<T> BatchReport<T> {
    pub(crate) fn empty() -> Self {
        Self {
            outputs: Vec::new(),
            failures: Vec::new(),
            total: 0,
        }
    }

    /// True when at least one item permanently failed.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of items that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }
}
