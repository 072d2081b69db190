/// Network adapters for the identity directory API
mod caching_token_provider;
mod graph_client;
mod token_client;

pub use caching_token_provider::CachingTokenProvider;
pub use graph_client::GraphDirectoryClient;
pub use token_client::ClientCredentialsTokenClient;

use crate::shared::Result;
use std::time::Duration;

/// Per-request timeout for directory, token and cloud-email calls
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Builds the shared HTTP client with the crate's user agent and timeout
pub fn build_http_client() -> Result<reqwest::Client> {
    let version = env!("CARGO_PKG_VERSION");
    let user_agent = format!("credwatch/{}", version);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
