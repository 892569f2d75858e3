//! Aggregation engine.
//!
//! Every query here is a pure read over a [`RecordSet`](crate::models::RecordSet):
//! nothing is cached between calls and the input is never modified.

pub mod aht;
pub mod attention;
pub mod normalize;
pub mod productivity;
pub mod queues;
pub mod ranking;

pub use aht::*;
pub use attention::*;
pub use normalize::*;
pub use productivity::*;
pub use queues::*;
pub use ranking::*;

use crate::models::{ProtocolRecord, Status};
use chrono::Duration;
use tracing::warn;

/// Sum of durations, `None` when the total does not fit a [`Duration`].
pub(crate) fn checked_total<I>(durations: I) -> Option<Duration>
where
    I: IntoIterator<Item = Duration>,
{
    let total = durations
        .into_iter()
        .try_fold(Duration::zero(), |sum, d| sum.checked_add(&d));
    if total.is_none() {
        warn!("Duration total overflowed; treating it as missing");
    }
    total
}

/// Sum of the parseable durations and how many there were.
///
/// The sum is `None` when it overflows.
pub(crate) fn sum_durations<'a, I>(records: I) -> (Option<Duration>, usize)
where
    I: IntoIterator<Item = &'a ProtocolRecord>,
{
    let durations: Vec<Duration> = records
        .into_iter()
        .filter_map(|r| r.analysis_duration)
        .collect();
    let count = durations.len();
    (checked_total(durations), count)
}

/// Mean of the parseable durations, `None` when there are none.
pub(crate) fn mean_duration<'a, I>(records: I) -> Option<Duration>
where
    I: IntoIterator<Item = &'a ProtocolRecord>,
{
    let (sum, count) = sum_durations(records);
    sum.and_then(|sum| divide(sum, count))
}

pub(crate) fn divide(sum: Duration, count: usize) -> Option<Duration> {
    if count == 0 {
        return None;
    }
    Some(Duration::milliseconds(sum.num_milliseconds() / count as i64))
}

/// Per-status tally used by the daily and leaderboard views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StatusCounts {
    pub in_progress: usize,
    pub completed: usize,
    pub reclassified: usize,
}

impl StatusCounts {
    /// Count one record; unknown statuses are ignored.
    pub fn add(&mut self, status: &Status) {
        match status {
            Status::InProgress => self.in_progress += 1,
            Status::Completed => self.completed += 1,
            Status::Reclassified => self.reclassified += 1,
            Status::Other(_) => {}
        }
    }

    pub fn total(&self) -> usize {
        self.in_progress + self.completed + self.reclassified
    }
}
