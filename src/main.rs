use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use env_logger::Env;
use harvest::{
    configuration::get_configuration,
    domain::DateRange,
    services::{scrape_reviews, ScrapeRequest},
};

/// Scrape product reviews from a review site into a JSON file, filtered by
/// an inclusive date range.
#[derive(Parser)]
#[command(name = "harvest", version)]
struct Args {
    /// Company or product name (slug format preferred, e.g. "slack")
    #[arg(long)]
    company: String,

    /// Review source: g2, capterra or sourceforge
    #[arg(long)]
    source: String,

    /// Inclusive range start, YYYY-MM-DD
    #[arg(long)]
    start_date: String,

    /// Inclusive range end, YYYY-MM-DD
    #[arg(long)]
    end_date: String,

    /// Run the browser headless. Default is a visible window, which gets
    /// blocked far less often.
    #[arg(long)]
    headless: bool,

    /// Override the auto-built review-listing URL
    #[arg(long)]
    start_url: Option<String>,

    /// Seconds to pause after the first navigation for manual actions
    #[arg(long, default_value_t = 0)]
    wait_after_nav: u64,

    /// Persistent browser profile directory, reused across runs so cookies
    /// and a manually solved challenge survive
    #[arg(long)]
    user_data_dir: Option<String>,

    /// Output file (default: {company}_{source}_reviews.json)
    #[arg(long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let configuration = get_configuration().expect("Failed to read configuration.");

    let start = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d")
        .with_context(|| format!("invalid --start-date {:?}, expected YYYY-MM-DD", args.start_date))?;
    let end = NaiveDate::parse_from_str(&args.end_date, "%Y-%m-%d")
        .with_context(|| format!("invalid --end-date {:?}, expected YYYY-MM-DD", args.end_date))?;
    let range = DateRange::new(start, end)?;

    log::info!(
        "Starting scrape: company={}, source={}, range={}..{}",
        args.company,
        args.source,
        start,
        end
    );

    let request = ScrapeRequest {
        company: args.company.clone(),
        source: args.source.clone(),
        range,
        headless: args.headless,
        start_url: args.start_url,
        wait_after_nav_secs: args.wait_after_nav,
        user_data_dir: args.user_data_dir,
    };

    let reviews = scrape_reviews(&request, &configuration).await?;

    let output = args
        .output
        .unwrap_or_else(|| format!("{}_{}_reviews.json", args.company, args.source));
    let json = serde_json::to_string_pretty(&reviews)?;
    std::fs::write(&output, json).with_context(|| format!("could not write {}", output))?;

    log::info!("Scraped {} reviews. Saved to {}", reviews.len(), output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn user_data_dir_flag_is_accepted() {
        let args = Args::try_parse_from([
            "harvest",
            "--company",
            "slack",
            "--source",
            "g2",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-06-30",
            "--user-data-dir",
            "/tmp/harvest-profile",
        ])
        .unwrap();

        assert_eq!(args.user_data_dir.as_deref(), Some("/tmp/harvest-profile"));
        assert!(!args.headless);
    }

    #[test]
    fn user_data_dir_defaults_to_none() {
        let args = Args::try_parse_from([
            "harvest",
            "--company",
            "slack",
            "--source",
            "g2",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-06-30",
        ])
        .unwrap();

        assert_eq!(args.user_data_dir, None);
    }
}

