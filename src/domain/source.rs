use serde::Serialize;

use crate::error::ScrapeError;

/// A registered review-hosting website. One per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    G2,
    Capterra,
    SourceForge,
}

pub const ALL_SOURCES: [Source; 3] = [Source::G2, Source::Capterra, Source::SourceForge];

impl Source {
    pub fn parse(value: &str) -> Result<Source, ScrapeError> {
        match value.to_lowercase().as_str() {
            "g2" => Ok(Source::G2),
            "capterra" => Ok(Source::Capterra),
            "sourceforge" => Ok(Source::SourceForge),
            other => Err(ScrapeError::UnknownSource(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::G2 => "g2",
            Source::Capterra => "capterra",
            Source::SourceForge => "sourceforge",
        }
    }

    /// Best-effort guess at the review listing URL for a company. Slugs are
    /// not validated against the site; when the guess is wrong the operator
    /// can pass an explicit start URL or navigate manually in the open
    /// browser window.
    pub fn review_url(&self, company: &str) -> String {
        let slug = slugify(company);
        match self {
            Source::G2 => format!("https://www.g2.com/products/{}/reviews", slug),
            Source::Capterra => format!("https://www.capterra.com/p/{}/reviews", slug),
            Source::SourceForge => {
                format!("https://sourceforge.net/software/product/{}/reviews", slug)
            }
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn slugify(company: &str) -> String {
    company.trim().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::{Source, ALL_SOURCES};
    use crate::error::ScrapeError;

    #[test]
    fn parse_known_sources() {
        assert_eq!(Source::parse("g2").unwrap(), Source::G2);
        assert_eq!(Source::parse("Capterra").unwrap(), Source::Capterra);
        assert_eq!(Source::parse("SOURCEFORGE").unwrap(), Source::SourceForge);
    }

    #[test]
    fn parse_unknown_source_fails() {
        let result = Source::parse("yelp");

        match result {
            Err(ScrapeError::UnknownSource(name)) => assert_eq!(name, "yelp"),
            other => panic!("expected UnknownSource, got {:?}", other),
        }
    }

    #[test]
    fn review_urls_use_slugged_company() {
        assert_eq!(
            Source::G2.review_url("Zoom Workplace"),
            "https://www.g2.com/products/zoom-workplace/reviews"
        );
        assert_eq!(
            Source::Capterra.review_url("slack"),
            "https://www.capterra.com/p/slack/reviews"
        );
        assert_eq!(
            Source::SourceForge.review_url("keepass"),
            "https://sourceforge.net/software/product/keepass/reviews"
        );
    }

    #[test]
    fn display_matches_serialized_name() {
        for source in ALL_SOURCES {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source));
        }
    }
}
