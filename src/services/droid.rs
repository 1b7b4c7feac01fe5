use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use thirtyfour::error::WebDriverError;
use thirtyfour::extensions::cdp::ChromeDevTools;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::configuration::{ScrapeSettings, WebDriverSettings};
use crate::domain::SelectorSet;
use crate::error::ScrapeError;

/// Plausible desktop window sizes; one is picked per session.
const WINDOW_SIZES: &[(u32, u32)] = &[
    (1280, 800),
    (1366, 768),
    (1440, 900),
    (1536, 864),
    (1680, 1050),
];

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const CHALLENGE_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// One anti-bot browser session. Owns the WebDriver handle for the whole run;
/// the pipeline quits it on every exit path.
pub struct Droid {
    pub driver: WebDriver,
    pause_min_ms: u64,
    pause_max_ms: u64,
}

impl Droid {
    /// Launch a session that looks as little like automation as practical:
    /// rotated user agent, jittered window rect, the automation-controlled
    /// blink flag disabled and the `navigator.webdriver` flag masked.
    /// Visible window unless headless is explicitly requested, since fully
    /// headless sessions get blocked far more often.
    pub async fn open(
        webdriver: &WebDriverSettings,
        scrape: &ScrapeSettings,
        headless: bool,
        user_data_dir: Option<&str>,
    ) -> Result<Droid, ScrapeError> {
        let user_agent = fake_user_agent::get_chrome_rua();

        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg(&format!("--user-agent={}", user_agent))?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_experimental_option("excludeSwitches", json!(["enable-automation"]))?;
        if headless {
            caps.set_headless()?;
        }
        // A persistent profile keeps cookies between runs, so one manually
        // solved challenge carries over to the next invocation.
        if let Some(dir) = user_data_dir {
            caps.add_arg(&format!("--user-data-dir={}", dir))?;
        }

        let driver = WebDriver::new(&webdriver.url, caps).await?;

        let (width, height, x, y) = {
            let mut rng = rand::thread_rng();
            let (w, h) = *WINDOW_SIZES.choose(&mut rng).unwrap_or(&(1366, 768));
            (w, h, rng.gen_range(0..80u32), rng.gen_range(0..60u32))
        };
        if let Err(e) = driver.set_window_rect(x, y, width, height).await {
            log::warn!("Could not set window rect: {:?}", e);
        }

        let dev_tools = ChromeDevTools::new(driver.handle.clone());
        let mask = json!({
            "source": "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });"
        });
        if let Err(e) = dev_tools
            .execute_cdp_with_params("Page.addScriptToEvaluateOnNewDocument", mask)
            .await
        {
            log::warn!("Could not install navigator.webdriver mask: {:?}", e);
        }

        log::info!(
            "Opened browser session | window {}x{} | ua {}",
            width,
            height,
            user_agent
        );

        Ok(Droid {
            driver,
            pause_min_ms: scrape.pause_min_ms,
            pause_max_ms: scrape.pause_max_ms,
        })
    }

    pub async fn goto(&self, url: &str) -> Result<(), WebDriverError> {
        self.driver.goto(url).await
    }

    pub async fn page_source(&self) -> Result<String, WebDriverError> {
        self.driver.source().await
    }

    /// Uniform random pause inside the configured pacing bounds.
    pub async fn human_pause(&self) {
        let ms = rand::thread_rng().gen_range(self.pause_min_ms..=self.pause_max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// A few wheel scrolls so JS-heavy pages render their review list.
    pub async fn scroll_warmup(&self, steps: u32) {
        for _ in 0..steps {
            let amount = rand::thread_rng().gen_range(600..1400);
            let scrolled = self
                .driver
                .execute("window.scrollBy(0, arguments[0]);", vec![json!(amount)])
                .await;
            if let Err(e) = scrolled {
                log::warn!("Scroll failed: {:?}", e);
                return;
            }
            self.human_pause().await;
        }
    }

    /// Best-effort click on the first visible cookie-accept candidate within
    /// `wait`. A missing banner is the normal case, not an error.
    pub async fn dismiss_consent(&self, sels: &SelectorSet, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            for css in sels.cookie_accept.iter().copied() {
                if let Ok(el) = self.driver.find(By::Css(css)).await {
                    if el.is_displayed().await.unwrap_or(false) && el.click().await.is_ok() {
                        log::info!("Dismissed consent banner via {:?}", css);
                        return true;
                    }
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn detect_challenge(&self, sels: &SelectorSet) -> bool {
        for css in sels.challenge_markers.iter().copied() {
            if self.driver.find(By::Css(css)).await.is_ok() {
                return true;
            }
        }
        false
    }

    /// Suspend automation while a human clears the challenge in the visible
    /// window. Resumes when the marker disappears or `max_wait` elapses;
    /// the timeout is a best-effort signal, not a failure.
    pub async fn await_manual_resolution(&self, sels: &SelectorSet, max_wait: Duration) -> bool {
        log::warn!(
            "Challenge detected. Solve it in the browser window; resuming automatically (up to {:?}).",
            max_wait
        );
        let deadline = tokio::time::Instant::now() + max_wait;

        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(CHALLENGE_POLL_INTERVAL).await;
            if !self.detect_challenge(sels).await {
                log::info!("Challenge cleared.");
                return true;
            }
        }

        log::warn!(
            "Challenge still present after {:?}; continuing best-effort.",
            max_wait
        );
        false
    }

    /// Bounded poll for an element to show up.
    pub async fn wait_for(&self, css: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.driver.find(By::Css(css)).await.is_ok() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            log::warn!("Failed to close browser session: {:?}", e);
        }
    }
}
