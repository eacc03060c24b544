use serde::{Deserialize, Serialize};

/// One entry of the lap ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    /// 0-based position in the ledger.
    pub index: usize,
    /// Stopwatch reading when the lap was taken.
    pub total_at_lap: u64,
    /// Time since the previous lap (or since start for the first one).
    pub split_since_last: u64,
}

impl Lap {
    /// Build the lap that would be appended to `ledger` at reading `total`.
    ///
    /// The index is the ledger length. A reading below the last total is
    /// treated as a zero split.
    pub fn following(ledger: &[Lap], total: u64) -> Self {
        let previous_total = ledger.last().map_or(0, |lap| lap.total_at_lap);
        let total_at_lap = total.max(previous_total);
        Self {
            index: ledger.len(),
            total_at_lap,
            split_since_last: total_at_lap - previous_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_lap_split_equals_total() {
        let lap = Lap::following(&[], 1_500);
        assert_eq!(
            lap,
            Lap {
                index: 0,
                total_at_lap: 1_500,
                split_since_last: 1_500
            }
        );
    }

    #[test]
    fn following_lap_splits_from_previous_total() {
        let first = Lap::following(&[], 1_500);
        let second = Lap::following(&[first], 2_500);
        assert_eq!(second.index, 1);
        assert_eq!(second.split_since_last, 1_000);
    }

    #[test]
    fn index_comes_from_ledger_length() {
        let stale = Lap {
            index: 7,
            total_at_lap: 1_000,
            split_since_last: 1_000,
        };
        let next = Lap::following(&[stale], 1_200);
        assert_eq!(next.index, 1);
        assert_eq!(next.split_since_last, 200);
    }
}
