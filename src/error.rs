use chrono::NaiveDate;
use thirtyfour::error::WebDriverError;
use thiserror::Error;

/// Run-level failures. Only `UnknownSource` and a failed first navigation
/// abort a run; everything else degrades to a partial result.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unknown review source: {0}")]
    UnknownSource(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("failed to open the review listing at {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: WebDriverError,
    },

    #[error("webdriver session error: {0}")]
    Session(#[from] WebDriverError),
}

/// Record-level failure from the date normalizer. Never fatal: the review is
/// kept with a null date and skipped by the range filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date text: {raw:?}")]
pub struct DateParseError {
    pub raw: String,
}
