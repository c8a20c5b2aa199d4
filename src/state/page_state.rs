/// Page state definitions for the listing crawl
///
/// Each search-result page moves through
/// `Pending -> Fetching -> {Extracted | Retry | PageFailed}`, with `Retry`
/// looping back to `Fetching` until the attempt bound is reached.
use std::fmt;

/// Represents the current state of a search-result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page index is in range but no request has been issued yet
    Pending,

    /// A fetch + extract cycle is in flight
    Fetching,

    /// The last cycle failed and another one is allowed
    Retry,

    // ===== Terminal States =====
    /// Listings were extracted and flushed to the CSV sink
    Extracted,

    /// All cycles were spent without a usable page
    PageFailed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Extracted | Self::PageFailed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Extracted)
                | (Self::Fetching, Self::Retry)
                | (Self::Fetching, Self::PageFailed)
                | (Self::Retry, Self::Fetching)
        )
    }

    /// Short lowercase label used in logs and run summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Retry => "retry",
            Self::Extracted => "extracted",
            Self::PageFailed => "page_failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Retry,
            Self::Extracted,
            Self::PageFailed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
