/// Crawl phase definitions for the pagination driver
///
/// A run moves strictly forward through these phases; `Failed` is reachable
/// from any non-terminal phase.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// First list page requested, page count unknown
    Start,

    /// Page count known, list pages not yet enqueued
    CountResolved,

    /// List pages outstanding; detail pages may already be in flight
    ListPagesPending,

    /// All list pages resolved; only detail pages outstanding
    DetailPagesPending,

    /// Every request resolved and every sink write issued
    Done,

    /// The run hit a fatal error
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the driver may move from this phase to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Start, CountResolved) => true,
            (CountResolved, ListPagesPending) => true,
            // Zero pages to crawl
            (CountResolved, Done) => true,
            (ListPagesPending, DetailPagesPending) => true,
            (DetailPagesPending, Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CountResolved => "count_resolved",
            Self::ListPagesPending => "list_pages_pending",
            Self::DetailPagesPending => "detail_pages_pending",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(CrawlPhase::Done.is_terminal());
        assert!(CrawlPhase::Failed.is_terminal());

        assert!(!CrawlPhase::Start.is_terminal());
        assert!(!CrawlPhase::CountResolved.is_terminal());
        assert!(!CrawlPhase::ListPagesPending.is_terminal());
        assert!(!CrawlPhase::DetailPagesPending.is_terminal());
    }

    #[test]
    fn test_forward_path() {
        let path = [
            CrawlPhase::Start,
            CrawlPhase::CountResolved,
            CrawlPhase::ListPagesPending,
            CrawlPhase::DetailPagesPending,
            CrawlPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_zero_pages_shortcut() {
        assert!(CrawlPhase::CountResolved.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::Start.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_failed_reachable_from_active_phases() {
        let phases = [
            CrawlPhase::Start,
            CrawlPhase::CountResolved,
            CrawlPhase::ListPagesPending,
            CrawlPhase::DetailPagesPending,
            CrawlPhase::Done,
            CrawlPhase::Failed,
        ];
        for phase in phases {
            assert_eq!(
                phase.can_transition_to(CrawlPhase::Failed),
                !phase.is_terminal(),
                "unexpected Failed transition from {}",
                phase
            );
        }
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!CrawlPhase::ListPagesPending.can_transition_to(CrawlPhase::Start));
        assert!(!CrawlPhase::DetailPagesPending.can_transition_to(CrawlPhase::ListPagesPending));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Start));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Start), "start");
        assert_eq!(format!("{}", CrawlPhase::DetailPagesPending), "detail_pages_pending");
    }
}
