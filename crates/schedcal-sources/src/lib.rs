//! DocumentFetcher trait and implementations.
//!
//! ```text
//! calendar url ──▶ DocumentFetcher::fetch ──▶ String (HTML)
//!                    ├─ WebFetcher     http(s), file://, paths
//!                    └─ StaticFetcher  in-memory documents
//! ```

pub mod error;
pub mod fetcher;

pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use fetcher::{
    BoxFuture, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DocumentFetcher, FetchConfig, StaticFetcher,
    WebFetcher,
};
