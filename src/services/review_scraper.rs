use std::time::Duration;

use chrono::NaiveDate;

use crate::configuration::Settings;
use crate::domain::{
    normalize, parse_rating, DateRange, RawReviewFragment, Review, SelectorSet, Source,
};
use crate::error::ScrapeError;
use crate::services::droid::Droid;
use crate::services::extractor::extract_fragments;
use crate::services::pagination::{range_complete, PageCursor, PageState};

/// One scrape run: one company, one source, one date range, one browser
/// session.
pub struct ScrapeRequest {
    pub company: String,
    pub source: String,
    pub range: DateRange,
    pub headless: bool,
    /// Overrides the heuristic review-listing URL when the slug guess is
    /// known to be wrong.
    pub start_url: Option<String>,
    /// Extra operator pause after the first navigation, for manually fixing
    /// the landing page or logging in.
    pub wait_after_nav_secs: u64,
    /// Persistent browser profile directory; cookies (and a solved
    /// challenge) survive across runs.
    pub user_data_dir: Option<String>,
}

/// Top-level orchestration. Fails fast on an unknown source or a failed
/// first navigation; every later problem degrades to a partial result. The
/// browser session is closed on every exit path.
pub async fn scrape_reviews(
    request: &ScrapeRequest,
    settings: &Settings,
) -> Result<Vec<Review>, ScrapeError> {
    let source = Source::parse(&request.source)?;
    let sels = SelectorSet::resolve(source);

    let droid = Droid::open(
        &settings.webdriver,
        &settings.scrape,
        request.headless,
        request.user_data_dir.as_deref(),
    )
    .await?;
    let result = run(&droid, source, sels, request, settings).await;
    droid.quit().await;

    result
}

async fn run(
    droid: &Droid,
    source: Source,
    sels: &SelectorSet,
    request: &ScrapeRequest,
    settings: &Settings,
) -> Result<Vec<Review>, ScrapeError> {
    let scrape = &settings.scrape;
    let url = request
        .start_url
        .clone()
        .unwrap_or_else(|| source.review_url(&request.company));

    log::info!("Navigating to {}", url);
    droid.goto(&url).await.map_err(|e| ScrapeError::Navigation {
        url: url.clone(),
        source: e,
    })?;

    droid
        .dismiss_consent(sels, Duration::from_millis(scrape.consent_wait_ms))
        .await;
    if droid.detect_challenge(sels).await {
        droid
            .await_manual_resolution(sels, Duration::from_secs(scrape.challenge_wait_secs))
            .await;
    }

    if request.wait_after_nav_secs > 0 {
        log::info!(
            "Pausing {}s for manual actions (solve a challenge, log in, navigate).",
            request.wait_after_nav_secs
        );
        tokio::time::sleep(Duration::from_secs(request.wait_after_nav_secs)).await;
    }

    droid.scroll_warmup(5).await;

    let today = chrono::Local::now().date_naive();
    let mut reviews: Vec<Review> = vec![];
    let mut cursor = PageCursor::new();

    loop {
        if droid.detect_challenge(sels).await {
            droid
                .await_manual_resolution(sels, Duration::from_secs(scrape.challenge_wait_secs))
                .await;
        }

        if !droid
            .wait_for(sels.review_card, Duration::from_secs(scrape.card_wait_secs))
            .await
        {
            log::warn!("No review cards found on page {}; stopping.", cursor.page);
            break;
        }

        let page_source = match droid.page_source().await {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Could not read page {}: {:?}", cursor.page, e);
                break;
            }
        };
        cursor.record_page(&page_source);

        let fragments = extract_fragments(&page_source, sels);
        let candidates = fragments.len();
        let harvest = collect_page(fragments, &request.company, source, &request.range, today);

        log::info!(
            "Page {}: {} review candidates, {} kept",
            cursor.page,
            candidates,
            harvest.reviews.len()
        );
        reviews.extend(harvest.reviews);

        if range_complete(sels.newest_first, harvest.dated, harvest.all_past_lower) {
            log::info!(
                "Every dated review on page {} is older than the range start; stopping early.",
                cursor.page
            );
            break;
        }

        match cursor.advance(droid, sels, scrape).await {
            PageState::Active => droid.human_pause().await,
            state => {
                log::info!("Pagination ended in {:?} after page {}.", state, cursor.page);
                break;
            }
        }
    }

    log::info!("Run finished with {} reviews.", reviews.len());
    Ok(reviews)
}

struct PageHarvest {
    reviews: Vec<Review>,
    /// Cards whose date text normalized.
    dated: usize,
    /// All normalized dates on the page fell below the range start.
    all_past_lower: bool,
}

/// Turn one page of fragments into retained records, preserving DOM order.
/// A review with an unparseable date is kept with a null date and skipped by
/// the range filter; it also casts no vote on early termination.
fn collect_page(
    fragments: Vec<RawReviewFragment>,
    company: &str,
    source: Source,
    range: &DateRange,
    today: NaiveDate,
) -> PageHarvest {
    let mut reviews = vec![];
    let mut dated = 0;
    let mut all_past_lower = true;

    for fragment in fragments {
        let rating = parse_rating(&fragment.rating_text);

        match normalize(&fragment.date_text, today) {
            Ok(date) => {
                dated += 1;
                if !range.is_past_lower_bound(date) {
                    all_past_lower = false;
                }
                if range.contains(date) {
                    reviews.push(Review {
                        company: company.to_string(),
                        source,
                        reviewer: fragment.reviewer,
                        rating,
                        title: fragment.title,
                        body: fragment.body,
                        date: Some(date),
                        raw_date_text: fragment.date_text,
                    });
                }
            }
            Err(failure) => {
                log::debug!("Keeping review with unparseable date {:?}", failure.raw);
                reviews.push(Review {
                    company: company.to_string(),
                    source,
                    reviewer: fragment.reviewer,
                    rating,
                    title: fragment.title,
                    body: fragment.body,
                    date: None,
                    raw_date_text: failure.raw,
                });
            }
        }
    }

    PageHarvest {
        reviews,
        dated,
        all_past_lower,
    }
}
