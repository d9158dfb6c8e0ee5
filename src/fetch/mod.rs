//! Page fetching and request pacing.
//!
//! - [`HttpFetcher`] performs one timeout-bounded GET per document
//! - [`PageFetcher`] is the seam the pipeline depends on
//! - [`RequestPacer`] enforces the fixed delay after every document

mod client;
pub mod constants;
mod error;
mod pacer;

pub use client::{HttpFetcher, PageFetcher};
pub use error::{FetchError, FetchErrorKind};
pub use pacer::RequestPacer;
