//! Best-effort lookup of a destination page's `<title>`.
//!
//! Lookups never fail from the caller's point of view: a timeout, a network
//! error, a non-2xx status or a page without a usable title all resolve to
//! the fallback value.

use crate::config::LinksConfig;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Invalid title regex pattern")
});

#[cfg(feature = "title-lookup")]
const USER_AGENT: &str = concat!("snip/", env!("CARGO_PKG_VERSION"));

/// Returns the first `<title>` of an HTML document with whitespace collapsed
/// and the common entities decoded. Empty titles count as missing.
pub fn extract_title(html: &str) -> Option<String> {
    let caps = TITLE_REGEX.captures(html)?;
    let collapsed = caps
        .get(1)?
        .as_str()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(decode_entities(&collapsed))
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[derive(Clone)]
pub struct TitleResolver {
    #[cfg(feature = "title-lookup")]
    client: reqwest::Client,
    enabled: bool,
    proxy: Option<String>,
    timeout: Duration,
}

impl TitleResolver {
    pub fn new(config: &LinksConfig) -> Result<Self> {
        Self::build(
            config.title_lookup,
            config.title_proxy().map(String::from),
            config.title_timeout(),
        )
    }

    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "title-lookup")]
            client: reqwest::Client::new(),
            enabled: false,
            proxy: None,
            timeout: Duration::ZERO,
        }
    }

    fn build(enabled: bool, proxy: Option<String>, timeout: Duration) -> Result<Self> {
        #[cfg(feature = "title-lookup")]
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            #[cfg(feature = "title-lookup")]
            client,
            enabled,
            proxy,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The address actually fetched: the target itself, or the proxy prefix
    /// followed by the percent-encoded target.
    pub fn lookup_url(&self, url: &str) -> String {
        match &self.proxy {
            Some(prefix) => {
                let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
                format!("{}{}", prefix, encoded)
            }
            None => url.to_string(),
        }
    }

    /// The page title, or `url` itself when no title could be found in time.
    pub async fn resolve(&self, url: &str) -> String {
        self.lookup(url).await.unwrap_or_else(|| url.to_string())
    }

    pub async fn lookup(&self, url: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        match tokio::time::timeout(self.timeout, self.fetch(url)).await {
            Ok(Ok(body)) => {
                let title = extract_title(&body);
                if title.is_none() {
                    tracing::debug!("No <title> found for {}", url);
                }
                title
            }
            Ok(Err(e)) => {
                tracing::debug!("Title lookup for {} failed: {:#}", url, e);
                None
            }
            Err(_) => {
                tracing::debug!(
                    "Title lookup for {} timed out after {:?}",
                    url,
                    self.timeout
                );
                None
            }
        }
    }

    #[cfg(feature = "title-lookup")]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(self.lookup_url(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    #[cfg(not(feature = "title-lookup"))]
    async fn fetch(&self, _url: &str) -> Result<String> {
        anyhow::bail!("title lookup is not compiled in")
    }
}
