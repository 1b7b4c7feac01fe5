use scraper::{ElementRef, Html, Selector};

use crate::domain::{RawReviewFragment, SelectorSet};

/// Pull every review card visible in a page-source snapshot, in DOM order.
/// Selector misses degrade to empty fields; nothing here can fail a run.
pub fn extract_fragments(page_source: &str, sels: &SelectorSet) -> Vec<RawReviewFragment> {
    let document = Html::parse_document(page_source);
    let card_selector = Selector::parse(sels.review_card).unwrap();

    document
        .select(&card_selector)
        .map(|card| RawReviewFragment {
            title: select_text(card, sels.title),
            body: select_text(card, sels.body),
            reviewer: sels
                .reviewer
                .map(|css| select_text(card, css))
                .unwrap_or_default(),
            rating_text: sels
                .rating
                .map(|css| select_rating_text(card, css))
                .unwrap_or_default(),
            date_text: select_date_text(card, sels.date),
        })
        .collect()
}

fn select_text(card: ElementRef, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };

    card.select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Star widgets often carry the value in an attribute rather than text:
/// `<meta itemprop="ratingValue" content="4.5">` or an aria-label.
fn select_rating_text(card: ElementRef, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };

    let Some(el) = card.select(&selector).next() else {
        return String::new();
    };

    for attr in ["content", "aria-label"] {
        if let Some(value) = el.value().attr(attr) {
            if !value.trim().is_empty() {
                return value.trim().to_string();
            }
        }
    }

    collapse_whitespace(&el.text().collect::<String>())
}

/// Prefer the visible text; fall back to `<time datetime="...">` when the
/// element renders empty.
fn select_date_text(card: ElementRef, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };

    let Some(el) = card.select(&selector).next() else {
        return String::new();
    };

    let text = collapse_whitespace(&el.text().collect::<String>());
    if !text.is_empty() {
        return text;
    }

    el.value()
        .attr("datetime")
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
