//! Level-by-level reduction of partial results into a single text.
//!
//! [`HierarchicalReducer`] folds a list of partials by repeatedly
//! partitioning the current level into consecutive groups of at most
//! `group_size`, merging each group through a [`MergeWorker`], and feeding
//! the outputs into the next level until one text remains. Partials are
//! never reordered and groups run sequentially, so the merger sees inputs
//! in document order.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::DEFAULT_GROUP_SIZE;
use crate::events::Event;
use crate::failures::TaskError;
use crate::worker::{MergeContext, MergeWorker};

/// Folds partial results hierarchically with a bounded group size.
///
/// Edge cases short-circuit without touching the merger: an empty input
/// reduces to an empty string and a single partial passes through as-is.
/// Two partials cost exactly one merger call.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use sumweave::failures::TaskError;
/// use sumweave::reducer::HierarchicalReducer;
/// use sumweave::worker::{MergeContext, MergeWorker};
///
/// struct JoinWithSpace;
///
/// #[async_trait]
/// impl MergeWorker for JoinWithSpace {
///     async fn merge(&self, combined: String, _ctx: MergeContext) -> Result<String, TaskError> {
///         Ok(combined.replace("\n\n", " "))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let reducer = HierarchicalReducer::new();
/// let partials = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
/// let merged = reducer.reduce(partials, &JoinWithSpace).await?;
/// assert_eq!(merged, "alpha beta gamma");
/// # Ok(())
/// # }
/// ```
pub struct HierarchicalReducer {
    group_size: usize,
    event_sender: Option<flume::Sender<Event>>,
}

impl Default for HierarchicalReducer {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            event_sender: None,
        }
    }
}

impl HierarchicalReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> HierarchicalReducerBuilder {
        HierarchicalReducerBuilder::default()
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Reduce partials to a single text.
    ///
    /// Each level partitions the current partials into consecutive groups of
    /// at most `group_size`; singleton groups pass through untouched, larger
    /// groups are joined with blank lines and handed to the merger. Level
    /// outputs become the next level's input until one text remains.
    ///
    /// # Errors
    ///
    /// The first merger error propagates immediately as
    /// [`ReduceError::Merge`] with the failing level and group position
    /// attached. Nothing is retried and no further groups run.
    #[tracing::instrument(skip(self, partials, merger), fields(partials = partials.len()))]
    pub async fn reduce<M: MergeWorker>(
        &self,
        partials: Vec<String>,
        merger: &M,
    ) -> Result<String, ReduceError> {
        if partials.is_empty() {
            return Ok(String::new());
        }
        if partials.len() == 1 {
            return Ok(partials.into_iter().next().unwrap_or_default());
        }

        let mut current = partials;
        let mut level = 1usize;

        while current.len() > 1 {
            let groups = partition(current, self.group_size);
            self.emit_level(level, &groups);

            let mut next = Vec::with_capacity(groups.len());
            for (position, group) in groups.into_iter().enumerate() {
                let group_number = position + 1;
                if group.len() == 1 {
                    next.extend(group);
                    continue;
                }

                let combined = group.join("\n\n");
                let ctx = match &self.event_sender {
                    Some(sender) => MergeContext::with_sender(level, group_number, sender.clone()),
                    None => MergeContext::new(level, group_number),
                };
                let merged = merger.merge(combined, ctx).await.map_err(|source| {
                    ReduceError::Merge {
                        level,
                        group: group_number,
                        source,
                    }
                })?;
                next.push(merged);
            }

            current = next;
            level += 1;
        }

        Ok(current.into_iter().next().unwrap_or_default())
    }

    fn emit_level(&self, level: usize, groups: &[Vec<String>]) {
        let Some(sender) = &self.event_sender else {
            return;
        };
        let partials: usize = groups.iter().map(Vec::len).sum();
        let _ = sender.send(Event::diagnostic(
            "reduce",
            format!(
                "level {level}: merging {partials} partials in {} groups",
                groups.len()
            ),
        ));
    }
}

/// Split one level into consecutive groups of at most `group_size`.
fn partition(level: Vec<String>, group_size: usize) -> Vec<Vec<String>> {
    let mut groups = Vec::with_capacity(level.len().div_ceil(group_size));
    let mut items = level.into_iter();
    loop {
        let group: Vec<String> = items.by_ref().take(group_size).collect();
        if group.is_empty() {
            return groups;
        }
        groups.push(group);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`HierarchicalReducer`].
pub struct HierarchicalReducerBuilder {
    group_size: usize,
    event_sender: Option<flume::Sender<Event>>,
}

impl Default for HierarchicalReducerBuilder {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            event_sender: None,
        }
    }
}

impl HierarchicalReducerBuilder {
    /// Partials merged per group and level. Must be at least 2.
    #[must_use]
    pub fn group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    /// Channel that receives a diagnostic event per level plus merger emits.
    #[must_use]
    pub fn event_sender(mut self, sender: flume::Sender<Event>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Validate the configuration and build the reducer.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::GroupSizeTooSmall`] for group sizes below 2,
    /// which could never shrink a level.
    pub fn try_build(self) -> Result<HierarchicalReducer, ReduceError> {
        if self.group_size < 2 {
            return Err(ReduceError::GroupSizeTooSmall {
                group_size: self.group_size,
            });
        }
        Ok(HierarchicalReducer {
            group_size: self.group_size,
            event_sender: self.event_sender,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors from reducer configuration or a failed group merge.
#[derive(Debug, Error, Diagnostic)]
pub enum ReduceError {
    #[error("group_size must be at least 2, got {group_size}")]
    #[diagnostic(
        code(sumweave::reducer::group_size),
        help("A group needs at least two members for a merge to shrink the level.")
    )]
    GroupSizeTooSmall { group_size: usize },

    #[error("merge failed at level {level}, group {group}: {source}")]
    #[diagnostic(code(sumweave::reducer::merge))]
    Merge {
        level: usize,
        group: usize,
        #[source]
        source: TaskError,
    },
}
