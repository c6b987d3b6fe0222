use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::table::Table;

pub mod api;
pub mod spreadsheet;

pub use api::ApiCollector;
pub use spreadsheet::SpreadsheetCollector;

/// A boundary that produces one source record set per run.
///
/// Collectors own their transport (file read, HTTP) and their retries; the
/// pipeline core only ever sees the resulting table.
#[async_trait]
pub trait SourceCollector: Send + Sync {
    /// Source identifier, matching the column-mapping key for this source
    fn source_id(&self) -> &'static str;

    /// Collect all records from this source into a table
    async fn collect(&self) -> Result<Table>;
}

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Bounded retry with exponential backoff around a network call.
/// Exhaustion returns the last error; the run aborts upstream.
pub(crate) async fn with_retry<T, F, Fut>(operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(err);
                }
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {}s",
                    operation,
                    attempt,
                    MAX_ATTEMPTS,
                    err,
                    backoff.as_secs()
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
        }
    }
}
