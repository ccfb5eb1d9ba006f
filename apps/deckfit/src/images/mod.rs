// Image acquisition: content-addressed cache, resilient HTTP fetcher and
// decode/crop helpers. The fetcher consults the cache before any request.

pub mod cache;
pub mod decode;
pub mod fetcher;

pub use cache::{CacheConfig, ImageCache};
pub use fetcher::{FetchConfig, FetchError, FetchOutcome, ImageFetcher};
