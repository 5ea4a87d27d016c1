use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a plain HTTP client. Requests are never retried: a failed
    /// fetch surfaces to the caller and the user re-runs.
    pub fn create_client() -> Client {
        Client::builder()
            .user_agent(concat!("stockscore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}
