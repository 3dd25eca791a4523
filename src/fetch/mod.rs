use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::{Error, Result};

/// Joins `base` and each segment with `/`.
///
/// Used for both the index URL and every filing URL, so segments are taken
/// verbatim (archive paths already contain their own slashes).
pub fn make_url<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.as_ref());
    }
    url
}

/// Source of raw documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the body at `url`, failing on any non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    /// The SEC refuses requests without a descriptive user agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder().gzip(true).build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await?;

        debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content = response.bytes().await?;
        debug!("Received content length: {}", content.len());
        Ok(content.to_vec())
    }
}
