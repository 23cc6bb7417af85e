/// Crawl phase definitions for the orchestrator's state machine
///
/// A session moves through these phases exactly once, in order.
use std::fmt;

/// Represents the current phase of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Nothing has happened yet
    Idle,

    /// Binary-searching the feed for its last page with images
    LocatingBound,

    /// Walking the page range and downloading images
    Crawling,

    // ===== Terminal Phases =====
    /// The whole page range was processed
    Completed,

    /// Stopped early by the user; counters up to that point are kept
    Interrupted,

    /// No page bound could be established, crawling never started
    Failed,
}

impl CrawlPhase {
    /// Returns true if this is a terminal phase (the session is over)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted | Self::Failed)
    }

    /// Returns true if the session ended without an error
    ///
    /// An interrupted crawl is a clean early stop, not a failure.
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }

    /// Returns true if the state machine allows moving to `next`
    ///
    /// # Allowed transitions
    ///
    /// | From | To |
    /// |------|----|
    /// | Idle | LocatingBound |
    /// | LocatingBound | Crawling, Interrupted, Failed |
    /// | Crawling | Completed, Interrupted |
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::LocatingBound)
                | (Self::LocatingBound, Self::Crawling)
                | (Self::LocatingBound, Self::Interrupted)
                | (Self::LocatingBound, Self::Failed)
                | (Self::Crawling, Self::Completed)
                | (Self::Crawling, Self::Interrupted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LocatingBound => "locating_bound",
            Self::Crawling => "crawling",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
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

    const ALL: [CrawlPhase; 6] = [
        CrawlPhase::Idle,
        CrawlPhase::LocatingBound,
        CrawlPhase::Crawling,
        CrawlPhase::Completed,
        CrawlPhase::Interrupted,
        CrawlPhase::Failed,
    ];

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::LocatingBound.is_terminal());
        assert!(!CrawlPhase::Crawling.is_terminal());

        assert!(CrawlPhase::Completed.is_terminal());
        assert!(CrawlPhase::Interrupted.is_terminal());
        assert!(CrawlPhase::Failed.is_terminal());
    }

    #[test]
    fn test_is_clean_exit() {
        assert!(CrawlPhase::Completed.is_clean_exit());
        assert!(CrawlPhase::Interrupted.is_clean_exit());
        assert!(!CrawlPhase::Failed.is_clean_exit());
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::LocatingBound));
        assert!(CrawlPhase::LocatingBound.can_transition_to(CrawlPhase::Crawling));
        assert!(CrawlPhase::Crawling.can_transition_to(CrawlPhase::Completed));
    }

    #[test]
    fn test_cannot_skip_locating() {
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Crawling));
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Completed));
    }

    #[test]
    fn test_failed_bound_never_crawls() {
        assert!(CrawlPhase::LocatingBound.can_transition_to(CrawlPhase::Failed));
        assert!(!CrawlPhase::Failed.can_transition_to(CrawlPhase::Crawling));
    }

    #[test]
    fn test_terminal_phases_are_final() {
        for from in ALL.iter().filter(|p| p.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition_to(to),
                    "{} -> {} should be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::LocatingBound.to_string(), "locating_bound");
        assert_eq!(CrawlPhase::Interrupted.to_string(), "interrupted");
    }
}
