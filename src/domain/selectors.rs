use super::source::Source;

/// CSS locators for one review site. Site markup drifts constantly, so these
/// are best-effort candidate lists; a miss degrades to an empty field, never
/// a failed run. Adding a source means adding one entry here plus a
/// `Source` variant.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet {
    pub review_card: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub date: &'static str,
    pub reviewer: Option<&'static str>,
    pub rating: Option<&'static str>,
    pub next_button: &'static str,
    pub cookie_accept: &'static [&'static str],
    pub challenge_markers: &'static [&'static str],
    /// Whether the site lists reviews newest-first by default. Only sources
    /// with this set may stop paginating early once a whole page falls below
    /// the requested range.
    pub newest_first: bool,
}

const COOKIE_ACCEPT: &[&str] = &[
    "button#onetrust-accept-btn-handler",
    "button[aria-label='Accept all']",
    "button[id*='accept']",
    "button[class*='consent'][class*='accept']",
];

const CHALLENGE_MARKERS: &[&str] = &[
    "iframe[src*='hcaptcha']",
    "iframe[src*='recaptcha']",
    "iframe[src*='turnstile']",
    "#challenge-stage",
    "#cf-challenge-running",
];

static G2: SelectorSet = SelectorSet {
    review_card: "div.paper, div.review",
    title: "div.review-content__title a, a.review-title, h3",
    body: "[itemprop='reviewBody'], div.review-body, div.review-content__body",
    date: "time, span.time-ago, span.display-date",
    reviewer: Some("[itemprop='author'], span.reviewer-name, a.consumer-name"),
    rating: Some("meta[itemprop='ratingValue'], [data-test='star-rating'], span[aria-label*='star']"),
    next_button: "a[aria-label='Next'], a.pagination__next, a[rel='next'], button[aria-label='Next']",
    cookie_accept: COOKIE_ACCEPT,
    challenge_markers: CHALLENGE_MARKERS,
    newest_first: true,
};

static CAPTERRA: SelectorSet = SelectorSet {
    review_card: "div.review-card, article[data-testid='review-card'], div[data-automation='review-card']",
    title: "h3.review-card-title, h3[data-testid='review-title'], h3",
    body: "div.review-card-text, div[data-testid='review-text'], [itemprop='reviewBody']",
    date: "div.review-card-date, time, span[data-testid='review-date']",
    reviewer: Some("div.reviewer-name, span[data-testid='reviewer-name'], [itemprop='author']"),
    rating: Some("div.star-rating, [data-testid='star-rating'], span[aria-label*='star']"),
    next_button: "button[aria-label='Next'], button.pagination-next, a[rel='next']",
    cookie_accept: COOKIE_ACCEPT,
    challenge_markers: CHALLENGE_MARKERS,
    newest_first: true,
};

static SOURCEFORGE: SelectorSet = SelectorSet {
    review_card: "section.topic, div.review, article.review",
    title: "p.lead, h3, a.title",
    body: "div.content, div.review-body, div.body",
    date: "span.posted-date, time, span.date",
    reviewer: Some("a.author, span.author, [itemprop='author']"),
    rating: Some("div.stars, span[aria-label*='star'], [itemprop='ratingValue']"),
    next_button: "a.pagination-next, a[rel='next'], a[aria-label='Next'], button[aria-label='Next']",
    cookie_accept: COOKIE_ACCEPT,
    challenge_markers: CHALLENGE_MARKERS,
    newest_first: true,
};

impl SelectorSet {
    pub fn resolve(source: Source) -> &'static SelectorSet {
        match source {
            Source::G2 => &G2,
            Source::Capterra => &CAPTERRA,
            Source::SourceForge => &SOURCEFORGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectorSet;
    use crate::domain::source::ALL_SOURCES;

    #[test]
    fn every_source_has_complete_selectors() {
        for source in ALL_SOURCES {
            let sels = SelectorSet::resolve(source);

            assert!(!sels.review_card.is_empty(), "{} review_card", source);
            assert!(!sels.title.is_empty(), "{} title", source);
            assert!(!sels.body.is_empty(), "{} body", source);
            assert!(!sels.date.is_empty(), "{} date", source);
            assert!(!sels.next_button.is_empty(), "{} next_button", source);
            assert!(!sels.cookie_accept.is_empty(), "{} cookie_accept", source);
            assert!(
                !sels.challenge_markers.is_empty(),
                "{} challenge_markers",
                source
            );
        }
    }

    #[test]
    fn every_selector_parses_as_css() {
        for source in ALL_SOURCES {
            let sels = SelectorSet::resolve(source);
            let required = [
                sels.review_card,
                sels.title,
                sels.body,
                sels.date,
                sels.next_button,
            ];

            for css in required
                .into_iter()
                .chain(sels.reviewer)
                .chain(sels.rating)
                .chain(sels.cookie_accept.iter().copied())
                .chain(sels.challenge_markers.iter().copied())
            {
                assert!(
                    scraper::Selector::parse(css).is_ok(),
                    "{}: bad selector {:?}",
                    source,
                    css
                );
            }
        }
    }
}
