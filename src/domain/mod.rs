pub mod dates;
pub mod review;
pub mod selectors;
pub mod source;

pub use dates::*;
pub use review::*;
pub use selectors::*;
pub use source::*;
