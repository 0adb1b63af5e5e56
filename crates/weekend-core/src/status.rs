//! Iteration status derived from checklist completion.
//!
//! Promotion is eager and demotion is conservative: checking anything wakes a
//! dormant iteration, checking everything completes it, but clearing every
//! box never sends it back to `not_started`.

use crate::checklist::ChecklistCounts;
use crate::types::IterationStatus;

/// Decide whether an iteration's stored status must change after a checklist
/// mutation. `None` means leave it as is.
///
/// `checked > total` is treated as fully checked.
pub fn reconcile_status(
    current: IterationStatus,
    total: usize,
    checked: usize,
) -> Option<IterationStatus> {
    if total == 0 {
        return None;
    }
    if checked >= total {
        return (current != IterationStatus::Complete).then_some(IterationStatus::Complete);
    }
    if checked > 0 {
        return match current {
            IterationStatus::Complete | IterationStatus::NotStarted => {
                Some(IterationStatus::InProgress)
            }
            IterationStatus::InProgress => None,
        };
    }
    None
}

/// [`reconcile_status`] over aggregated counts.
pub fn reconcile_counts(current: IterationStatus, counts: ChecklistCounts) -> Option<IterationStatus> {
    reconcile_status(current, counts.total, counts.checked)
}

/// Status to force when a plan edit replaces a checklist wholesale.
///
/// A completed iteration whose old checklist had checked items drops back to
/// `in_progress`, since the replacement is all unchecked. An explicit status
/// supplied with the same update takes precedence and suppresses this.
pub fn status_after_plan_replacement(
    current: IterationStatus,
    previously_checked: usize,
    explicit: Option<IterationStatus>,
) -> Option<IterationStatus> {
    if explicit.is_some() || previously_checked == 0 {
        return None;
    }
    (current == IterationStatus::Complete).then_some(IterationStatus::InProgress)
}
