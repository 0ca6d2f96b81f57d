//! Rating to search budget calibration.

use serde::Serialize;
use std::time::Duration;

/// Depth and time ceilings for a single engine search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SearchBudget {
    /// Maximum search depth in plies. Always at least 1.
    pub depth: u32,
    /// Maximum thinking time. Always positive.
    pub time_limit: Duration,
}

impl SearchBudget {
    /// The time ceiling in whole milliseconds, as sent in `go movetime`.
    pub fn movetime_ms(&self) -> u64 {
        self.time_limit.as_millis() as u64
    }
}

/// `(rating upper bound, exclusive) -> (depth, time limit in ms)`, ascending.
const BUDGET_TABLE: [(i64, u32, u64); 10] = [
    (800, 1, 100),
    (1000, 2, 200),
    (1200, 3, 300),
    (1400, 4, 500),
    (1600, 5, 800),
    (1800, 6, 1000),
    (2000, 7, 1500),
    (2200, 8, 2000),
    (2400, 9, 3000),
    (2600, 10, 4000),
];

/// Budget for every rating at or above the last threshold.
const TOP_BUDGET: (u32, u64) = (12, 5000);

/// Maps a skill rating to a search budget.
///
/// The first row whose threshold is strictly greater than `rating` wins.
/// Every integer maps to some budget: very low and negative ratings get the
/// weakest search, anything from 2600 up gets the strongest.
pub fn map_rating(rating: i64) -> SearchBudget {
    let (depth, millis) = BUDGET_TABLE
        .iter()
        .find(|(threshold, _, _)| rating < *threshold)
        .map(|&(_, depth, millis)| (depth, millis))
        .unwrap_or(TOP_BUDGET);

    SearchBudget {
        depth,
        time_limit: Duration::from_millis(millis),
    }
}
