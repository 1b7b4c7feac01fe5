use sha2::{Digest, Sha256};
use thirtyfour::By;

use crate::configuration::ScrapeSettings;
use crate::domain::SelectorSet;
use crate::services::droid::Droid;

/// Where the traversal stands after a page. Everything except `Active` is
/// terminal; the pipeline returns whatever it gathered so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Active,
    /// No "next" control, or it is disabled.
    Exhausted,
    /// Every remaining page would fall below the requested range.
    RangeComplete,
    /// Clicking "next" changed nothing within the recheck budget. Safety
    /// valve against a misbehaving control looping forever; treated like
    /// `Exhausted` but logged distinctly.
    Stalled,
}

impl PageState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PageState::Active)
    }
}

type PageDigest = [u8; 32];

pub fn page_digest(page_source: &str) -> PageDigest {
    Sha256::digest(page_source.as_bytes()).into()
}

/// Decide whether a finished page ends the run early: only when the source is
/// newest-first, at least one date on the page parsed, and every parsed date
/// fell below the range start.
pub fn range_complete(newest_first: bool, dated_count: usize, all_past_lower: bool) -> bool {
    newest_first && dated_count > 0 && all_past_lower
}

/// Transient traversal state, one per run.
pub struct PageCursor {
    pub page: u32,
    last_digest: Option<PageDigest>,
}

impl PageCursor {
    pub fn new() -> Self {
        PageCursor {
            page: 1,
            last_digest: None,
        }
    }

    /// Remember what the current page looked like before trying to leave it.
    pub fn record_page(&mut self, page_source: &str) {
        self.last_digest = Some(page_digest(page_source));
    }

    /// True when the snapshot differs from the recorded page, i.e. the click
    /// actually moved us somewhere.
    pub fn content_changed(&self, page_source: &str) -> bool {
        match self.last_digest {
            Some(previous) => page_digest(page_source) != previous,
            None => true,
        }
    }

    /// Try to move to the next result page. Absent or disabled control means
    /// the listing is exhausted; a click that never changes the content
    /// within the recheck budget means the control is stalling.
    pub async fn advance(
        &mut self,
        droid: &Droid,
        sels: &SelectorSet,
        settings: &ScrapeSettings,
    ) -> PageState {
        let next = match droid.driver.find(By::Css(sels.next_button)).await {
            Ok(el) => el,
            Err(_) => {
                log::info!("No next-page control on page {}; listing exhausted.", self.page);
                return PageState::Exhausted;
            }
        };

        if !next.is_enabled().await.unwrap_or(false) || has_disabled_marker(&next).await {
            log::info!("Next-page control disabled on page {}; listing exhausted.", self.page);
            return PageState::Exhausted;
        }

        // Bring the control into view the way a reader would reach it.
        let _ = next.scroll_into_view().await;
        droid.human_pause().await;

        if let Err(e) = next.click().await {
            log::warn!("Could not activate next-page control: {:?}", e);
            return PageState::Exhausted;
        }

        for _ in 0..settings.stall_rechecks {
            tokio::time::sleep(std::time::Duration::from_millis(settings.page_settle_ms)).await;

            match droid.page_source().await {
                Ok(source) if self.content_changed(&source) => {
                    self.page += 1;
                    return PageState::Active;
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Could not read page source while advancing: {:?}", e);
                }
            }
        }

        log::warn!(
            "Next-page control clicked on page {} but content never changed; treating as stalled.",
            self.page
        );
        PageState::Stalled
    }
}

async fn has_disabled_marker(el: &thirtyfour::WebElement) -> bool {
    if let Ok(Some(aria)) = el.attr("aria-disabled").await {
        if aria == "true" {
            return true;
        }
    }
    if let Ok(Some(class)) = el.attr("class").await {
        if class.split_whitespace().any(|c| c.contains("disabled")) {
            return true;
        }
    }
    false
}
