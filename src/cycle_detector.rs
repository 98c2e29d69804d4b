use std::collections::HashMap;

/// Counts how many times each state was reached during a match.
///
/// A match whose state comes back for the third time is considered stuck in a loop, whatever
/// the length of the cycle.
#[derive(Debug, Default)]
pub struct CycleDetector {
    occurrences: HashMap<String, u32>,
}

impl CycleDetector {
    /// Number of occurrences of a state that is still tolerated
    pub const MAX_REPETITIONS: u32 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more occurrence of `key`. Returns `true` if this state was now reached more
    /// than [`MAX_REPETITIONS`](Self::MAX_REPETITIONS) times.
    pub fn observe(&mut self, key: String) -> bool {
        let count = self.occurrences.entry(key).or_insert(0);
        *count += 1;
        *count > Self::MAX_REPETITIONS
    }

    #[cfg(test)]
    fn occurrences(&self, key: &str) -> u32 {
        self.occurrences.get(key).copied().unwrap_or(0)
    }
}
