use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub webdriver: WebDriverSettings,
    pub scrape: ScrapeSettings,
}

#[derive(Deserialize, Clone)]
pub struct WebDriverSettings {
    /// Chromedriver endpoint, e.g. http://localhost:9515
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct ScrapeSettings {
    /// How long a human operator gets to clear a challenge before the run
    /// continues best-effort.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub challenge_wait_secs: u64,
    /// Bounded wait for review cards to appear on a page.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub card_wait_secs: u64,
    /// How long the consent banner gets to show up before we move on.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub consent_wait_ms: u64,
    /// Delay between content re-checks after clicking "next".
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_settle_ms: u64,
    /// Re-checks before declaring the pagination stalled.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub stall_rechecks: u32,
    /// Human-pacing bounds between page interactions.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pause_min_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pause_max_ms: u64,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("webdriver.url", "http://localhost:9515")?
        .set_default("scrape.challenge_wait_secs", 120)?
        .set_default("scrape.card_wait_secs", 15)?
        .set_default("scrape.consent_wait_ms", 1500)?
        .set_default("scrape.page_settle_ms", 1000)?
        .set_default("scrape.stall_rechecks", 5)?
        .set_default("scrape.pause_min_ms", 800)?
        .set_default("scrape.pause_max_ms", 1800)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("HARVEST")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    validate_pacing(&settings)?;

    Ok(settings)
}

/// File and env overrides can hand us an inverted pacing pair, which would
/// panic deep inside the session controller; reject it up front.
fn validate_pacing(settings: &Settings) -> Result<(), config::ConfigError> {
    if settings.scrape.pause_min_ms > settings.scrape.pause_max_ms {
        return Err(config::ConfigError::Message(format!(
            "scrape.pause_min_ms ({}) must not exceed scrape.pause_max_ms ({})",
            settings.scrape.pause_min_ms, settings.scrape.pause_max_ms
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{get_configuration, validate_pacing};

    #[test]
    fn defaults_are_complete() {
        let settings = get_configuration().expect("default configuration should build");

        assert_eq!(settings.scrape.challenge_wait_secs, 120);
        assert_eq!(settings.scrape.stall_rechecks, 5);
        assert!(settings.scrape.pause_min_ms < settings.scrape.pause_max_ms);
        assert!(settings.webdriver.url.starts_with("http"));
    }

    #[test]
    fn inverted_pacing_bounds_are_rejected() {
        let mut settings = get_configuration().expect("default configuration should build");
        settings.scrape.pause_min_ms = settings.scrape.pause_max_ms + 1;

        let err = validate_pacing(&settings).expect_err("inverted pacing should not validate");
        assert!(err.to_string().contains("pause_min_ms"));
    }
}
