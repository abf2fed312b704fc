pub mod fetcher;
pub mod pipeline;

pub use fetcher::{FetchedSource, HttpFetcher, SourceFetcher};
pub use pipeline::{CacheTier, ResizeOutcome};
