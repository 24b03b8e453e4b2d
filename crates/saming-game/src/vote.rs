//! Vote finalization.
//!
//! The live tally is kept incrementally by the room controller; this
//! module only decides who (if anyone) the final tally eliminates.

use std::collections::BTreeMap;

use saming_protocol::PlayerId;

/// The target with strictly the most votes.
///
/// Returns `None` when nobody voted or when the top count is shared —
/// ties eliminate no one and play continues.
pub fn leader(tally: &BTreeMap<PlayerId, u32>) -> Option<PlayerId> {
    let top = tally.values().copied().max().filter(|c| *c > 0)?;
    let mut leaders = tally.iter().filter(|(_, count)| **count == top);
    let (id, _) = leaders.next()?;
    leaders.next().is_none().then(|| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(PlayerId, u32)]) -> BTreeMap<PlayerId, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_unique_top_count_wins() {
        let (a, b) = (PlayerId::new(), PlayerId::new());
        assert_eq!(leader(&tally(&[(a, 3), (b, 1)])), Some(a));
    }

    #[test]
    fn test_tie_eliminates_nobody() {
        let (a, b) = (PlayerId::new(), PlayerId::new());
        assert_eq!(leader(&tally(&[(a, 2), (b, 2)])), None);
    }

    #[test]
    fn test_three_way_tie_eliminates_nobody() {
        let (a, b, c) = (PlayerId::new(), PlayerId::new(), PlayerId::new());
        assert_eq!(leader(&tally(&[(a, 1), (b, 1), (c, 1)])), None);
    }

    #[test]
    fn test_no_votes_eliminates_nobody() {
        assert_eq!(leader(&BTreeMap::new()), None);
    }

    #[test]
    fn test_single_vote_is_enough() {
        let a = PlayerId::new();
        assert_eq!(leader(&tally(&[(a, 1)])), Some(a));
    }
}
