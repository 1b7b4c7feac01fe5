use chrono::NaiveDate;
use serde::Serialize;

use super::source::Source;

/// Unprocessed text pulled from one review card, in DOM order. Lives for one
/// page-extraction pass; a missing field is an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReviewFragment {
    pub title: String,
    pub body: String,
    pub reviewer: String,
    pub rating_text: String,
    pub date_text: String,
}

/// Canonical output record. `date` is null when the raw text did not
/// normalize; the raw text is always kept for audit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Review {
    pub company: String,
    pub source: Source,
    pub reviewer: String,
    pub rating: Option<f32>,
    pub title: String,
    pub body: String,
    pub date: Option<NaiveDate>,
    pub raw_date_text: String,
}

/// Pull a numeric rating out of star-widget text like "4.5 out of 5 stars",
/// "Rated 4/5" or a bare "4.0". Anything that does not yield a plausible
/// star value is None rather than a guess.
pub fn parse_rating(text: &str) -> Option<f32> {
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '/');

        let candidate = match token.split_once('/') {
            Some((numerator, _)) => numerator,
            None => token,
        };

        if let Ok(value) = candidate.parse::<f32>() {
            if (0.0..=10.0).contains(&value) {
                return Some(value);
            }
        }
    }

    None
}
