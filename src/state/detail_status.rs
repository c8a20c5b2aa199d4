use std::fmt;

/// Longest status cell written for a failed detail fetch
pub const MAX_STATUS_LEN: usize = 120;

/// Outcome of enriching one listing from its detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStatus {
    /// Detail page fetched and parsed
    Ok,

    /// The site served the "log in to see more" variant instead of details
    LoginRequired,

    /// The listing had no detail link, so nothing was fetched
    Skipped,

    /// Fetching or parsing failed; the reason is kept for the output row
    Failed(String),
}

impl DetailStatus {
    /// Stable label used for counting, independent of any failure reason
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::LoginRequired => "login_required",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Value written into the status column, capped at [`MAX_STATUS_LEN`] characters
    pub fn to_cell(&self) -> String {
        match self {
            Self::Failed(reason) => format!("failed: {}", reason)
                .chars()
                .take(MAX_STATUS_LEN)
                .collect(),
            other => other.kind().to_string(),
        }
    }
}

impl fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed ({})", reason),
            other => write!(f, "{}", other.kind()),
        }
    }
}
