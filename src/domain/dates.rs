use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};

use crate::error::{DateParseError, ScrapeError};

/// Inclusive calendar-date range supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<DateRange, ScrapeError> {
        if end < start {
            return Err(ScrapeError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Used for early pagination termination on newest-first sources: once a
    /// whole page of dates sits below `start`, later pages cannot be in
    /// range.
    pub fn is_past_lower_bound(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

/// Prefixes sites stick in front of the actual date ("Written on June 5, 2024").
const DATE_PREFIXES: &[&str] = &[
    "written on",
    "posted on",
    "reviewed on",
    "updated on",
    "reviewed",
    "updated",
    "posted",
];

/// Absolute layouts tried in order. Day-month-year numerals come before
/// month-day-year, so ambiguous text like "03/04/2024" resolves day-first
/// (April 3). Month names are unambiguous and handled earlier. This priority
/// is fixed and best-effort; it cannot be correct for every locale.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B, %Y",
    "%d %B %Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Chrono treats format whitespace as optional, so month-year text like
/// "May 2024" can satisfy "%B %d %Y" as day 20 of year 24. Any parse below
/// this floor is a misread of the input, not a real review date.
const MIN_PLAUSIBLE_YEAR: i32 = 1900;

/// Turn free-form review date text into a calendar date. Relative forms are
/// computed from `today`; absolute forms go through `DATE_FORMATS`. On
/// failure the original text comes back inside the error so the record can
/// keep it for audit.
pub fn normalize(text: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let cleaned = strip_prefixes(text);

    if !cleaned.is_empty() {
        if let Some(date) = parse_relative(&cleaned.to_lowercase(), today) {
            return Ok(date);
        }
        if let Some(date) = parse_absolute(&cleaned) {
            return Ok(date);
        }
    }

    Err(DateParseError {
        raw: text.to_string(),
    })
}

fn strip_prefixes(text: &str) -> String {
    let trimmed = text.trim();

    for prefix in DATE_PREFIXES {
        if trimmed.len() >= prefix.len()
            && trimmed.is_char_boundary(prefix.len())
            && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return trimmed[prefix.len()..]
                .trim()
                .trim_start_matches(':')
                .trim()
                .to_string();
        }
    }

    trimmed.to_string()
}

fn parse_relative(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    match lower {
        "today" | "just now" => return Some(today),
        "yesterday" => return today.pred_opt(),
        "last week" => return today.checked_sub_days(chrono::Days::new(7)),
        "last month" => return today.checked_sub_months(Months::new(1)),
        "last year" => return today.checked_sub_months(Months::new(12)),
        _ => {}
    }

    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let [count, unit, "ago"] = tokens.as_slice() else {
        return None;
    };

    let n: u32 = match *count {
        "a" | "an" | "one" => 1,
        other => other.parse().ok()?,
    };

    match unit.trim_end_matches('s') {
        // Sub-day granularity still means "today" on a calendar.
        "second" | "minute" | "hour" => Some(today),
        "day" => today.checked_sub_days(chrono::Days::new(n as u64)),
        "week" => today.checked_sub_days(chrono::Days::new(n as u64 * 7)),
        "month" => today.checked_sub_months(Months::new(n)),
        "year" => today.checked_sub_months(Months::new(n.checked_mul(12)?)),
        _ => None,
    }
}

fn parse_absolute(cleaned: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return plausible(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return plausible(dt.date());
        }
    }

    // Month-year only ("May 2024") maps to the first of the month. This must
    // run before the generic formats: "%B %d %Y" would otherwise swallow the
    // year digits as a day-plus-two-digit-year.
    if cleaned.split_whitespace().count() == 2 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", cleaned), "%d %B %Y") {
            if let Some(date) = plausible(date) {
                return Some(date);
            }
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            if let Some(date) = plausible(date) {
                return Some(date);
            }
        }
    }

    None
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;

    (date.year() >= MIN_PLAUSIBLE_YEAR).then_some(date)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{normalize, DateRange};
    use crate::error::ScrapeError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reference() -> NaiveDate {
        d(2024, 6, 15)
    }

    #[test]
    fn relative_dates() {
        assert_eq!(normalize("today", reference()).unwrap(), d(2024, 6, 15));
        assert_eq!(normalize("yesterday", reference()).unwrap(), d(2024, 6, 14));
        assert_eq!(normalize("2 days ago", reference()).unwrap(), d(2024, 6, 13));
        assert_eq!(normalize("a week ago", reference()).unwrap(), d(2024, 6, 8));
        assert_eq!(normalize("3 weeks ago", reference()).unwrap(), d(2024, 5, 25));
        assert_eq!(normalize("2 months ago", reference()).unwrap(), d(2024, 4, 15));
        assert_eq!(normalize("1 year ago", reference()).unwrap(), d(2023, 6, 15));
        assert_eq!(normalize("5 hours ago", reference()).unwrap(), d(2024, 6, 15));
    }

    #[test]
    fn absolute_layouts() {
        assert_eq!(normalize("2024-03-09", reference()).unwrap(), d(2024, 3, 9));
        assert_eq!(normalize("June 5, 2024", reference()).unwrap(), d(2024, 6, 5));
        assert_eq!(normalize("5 June 2024", reference()).unwrap(), d(2024, 6, 5));
        assert_eq!(normalize("Jun 5, 2024", reference()).unwrap(), d(2024, 6, 5));
        assert_eq!(normalize("May 2024", reference()).unwrap(), d(2024, 5, 1));
        assert_eq!(
            normalize("2024-03-09T14:02:11", reference()).unwrap(),
            d(2024, 3, 9)
        );
    }

    #[test]
    fn ambiguous_numerals_resolve_day_first() {
        assert_eq!(normalize("03/04/2024", reference()).unwrap(), d(2024, 4, 3));
        // Day over 12 forces the month-day-year fallback.
        assert_eq!(normalize("04/13/2024", reference()).unwrap(), d(2024, 4, 13));
    }

    #[test]
    fn month_year_text_never_collapses_to_an_ancient_date() {
        // "May 2024" must not satisfy "%B %d %Y" as day 20, year 24; a
        // misread that old would both drop the review and cast a bogus
        // early-termination vote.
        let date = normalize("May 2024", reference()).unwrap();
        assert_eq!(date, d(2024, 5, 1));

        let range = DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert!(range.contains(date));
        assert!(!range.is_past_lower_bound(date));

        assert_eq!(normalize("Feb 2023", reference()).unwrap(), d(2023, 2, 1));
    }

    #[test]
    fn implausibly_old_years_fail_to_parse() {
        assert!(normalize("May 20, 0024", reference()).is_err());
        assert!(normalize("0024-05-20", reference()).is_err());
    }

    #[test]
    fn site_prefixes_are_stripped() {
        assert_eq!(
            normalize("Written on June 5, 2024", reference()).unwrap(),
            d(2024, 6, 5)
        );
        assert_eq!(
            normalize("Posted on 2024-01-02", reference()).unwrap(),
            d(2024, 1, 2)
        );
        assert_eq!(
            normalize("Updated 3 days ago", reference()).unwrap(),
            d(2024, 6, 12)
        );
    }

    #[test]
    fn normalizing_is_idempotent_on_iso_output() {
        for raw in ["2 days ago", "June 5, 2024", "yesterday", "03/04/2024"] {
            let first = normalize(raw, reference()).unwrap();
            let second = normalize(&first.to_string(), reference()).unwrap();
            assert_eq!(first, second, "{raw}");
        }
    }

    #[test]
    fn failure_keeps_original_text() {
        let err = normalize("sometime last spring", reference()).unwrap_err();
        assert_eq!(err.raw, "sometime last spring");

        assert!(normalize("", reference()).is_err());
        assert!(normalize("   ", reference()).is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 2, 20)).unwrap();

        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(range.contains(d(2024, 2, 1)));
        assert!(!range.contains(d(2024, 1, 9)));
        assert!(!range.contains(d(2024, 2, 21)));
    }

    #[test]
    fn past_lower_bound_predicate() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 2, 20)).unwrap();

        assert!(range.is_past_lower_bound(d(2024, 1, 9)));
        assert!(!range.is_past_lower_bound(range.start));
        assert!(!range.is_past_lower_bound(d(2024, 3, 1)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = DateRange::new(d(2024, 2, 1), d(2024, 1, 1));

        assert!(matches!(
            result,
            Err(ScrapeError::InvalidDateRange { .. })
        ));
    }
}
