use crate::config::RunOnly;
use crate::phases::ListStrategy;

/// Pick the work-list strategy for one iteration.
///
/// Melee wins outright. Otherwise the smart list needs both fresh ratings
/// and the coordinating-server run mode; anything else gets the default list.
pub fn select_strategy(melee: bool, run_only: RunOnly, ratings_fresh: bool) -> ListStrategy {
    if melee {
        ListStrategy::Melee
    } else if ratings_fresh && run_only == RunOnly::Server {
        ListStrategy::Smart
    } else {
        ListStrategy::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_wins_regardless_of_ratings_and_mode() {
        for run_only in [RunOnly::General, RunOnly::Server] {
            for fresh in [false, true] {
                assert_eq!(select_strategy(true, run_only, fresh), ListStrategy::Melee);
            }
        }
    }

    #[test]
    fn test_smart_needs_server_and_fresh_ratings() {
        assert_eq!(
            select_strategy(false, RunOnly::Server, true),
            ListStrategy::Smart
        );
        assert_eq!(
            select_strategy(false, RunOnly::Server, false),
            ListStrategy::Default
        );
        assert_eq!(
            select_strategy(false, RunOnly::General, true),
            ListStrategy::Default
        );
        assert_eq!(
            select_strategy(false, RunOnly::General, false),
            ListStrategy::Default
        );
    }
}
