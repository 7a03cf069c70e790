//! Deletion task model for asynchronous soft deletion.

use std::collections::HashSet;

/// A request to soft-delete a set of short codes on behalf of one owner.
///
/// Created by [`crate::application::services::DeletionService`], queued on
/// the bounded deletion channel and applied by
/// [`crate::domain::deletion_worker`] workers.
///
/// # Lifecycle
///
/// `Submitted → Queued → Dequeued → Applied | AppliedPartial`
///
/// There is no failed state: a task whose backend call errors is logged and
/// dropped, and a task still queued at shutdown is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTask {
    pub codes: Vec<String>,
    pub owner_id: String,
}

impl DeletionTask {
    /// Creates a new deletion task. Repeated codes are kept once, in
    /// first-seen order.
    pub fn new(mut codes: Vec<String>, owner_id: impl Into<String>) -> Self {
        let mut seen = HashSet::with_capacity(codes.len());
        codes.retain(|code| seen.insert(code.clone()));

        Self {
            codes,
            owner_id: owner_id.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Terminal state of an applied deletion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Every requested code matched a record owned by the submitter.
    Applied,
    /// Some codes were unknown or owned by someone else and were skipped.
    AppliedPartial { skipped: usize },
}

impl DeletionOutcome {
    /// Derives the outcome from the number of requested and matched codes.
    pub fn from_counts(requested: usize, matched: u64) -> Self {
        let matched = usize::try_from(matched).unwrap_or(usize::MAX);
        if matched >= requested {
            Self::Applied
        } else {
            Self::AppliedPartial {
                skipped: requested - matched,
            }
        }
    }
}
