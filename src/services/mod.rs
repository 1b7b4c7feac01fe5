pub mod droid;
pub mod extractor;
pub mod pagination;
pub mod review_scraper;

pub use droid::*;
pub use extractor::*;
pub use pagination::*;
pub use review_scraper::*;
