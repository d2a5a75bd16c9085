use std::time::Duration;

pub mod config;
pub mod lionheart_client;
pub mod metrics;
pub mod strava_client;
pub mod types;

/// Per-request ceiling; a timeout is treated like any other network failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
