pub mod yahoo;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    models::{InfoRecord, Period, PriceRow, UpstreamError},
    Config,
};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Market-data provider consumed by the ticker gateway.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Key/value company record for `ticker`.
    async fn info(&self, ticker: &str) -> Result<InfoRecord, UpstreamError>;

    /// Daily price table for `ticker` over `period`, oldest first.
    async fn history(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, UpstreamError>;
}

/// Yahoo Finance client.
pub struct External {
    client: Client,
    query_url: String,
    cookie_url: String,
    crumb: Mutex<Option<String>>,
}

impl External {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(External {
            client,
            query_url: config.yahoo_query_url.clone(),
            cookie_url: config.yahoo_cookie_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.query_url)
            .map_err(|e| UpstreamError::Parse(format!("{}: {e}", self.query_url)))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Parse(format!("{} is not a base URL", self.query_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The quoteSummary API only answers requests carrying a session cookie
    /// and its matching crumb.
    async fn crumb(&self) -> Result<String, UpstreamError> {
        let mut crumb = self.crumb.lock().await;
        if let Some(crumb) = crumb.as_ref() {
            return Ok(crumb.clone());
        }

        // Usually a 404, but the response still sets the session cookie.
        self.client.get(&self.cookie_url).send().await?;

        let response = self
            .client
            .get(self.endpoint(&["v1", "test", "getcrumb"])?)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(UpstreamError::Unauthorized);
        }
        let fresh = yahoo::parse_crumb(&response.error_for_status()?.text().await?)?;
        debug!("Obtained Yahoo session crumb");
        *crumb = Some(fresh.clone());
        Ok(fresh)
    }

    async fn forget_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

/// Yahoo still sends a JSON error document with most 4xx answers; only fall
/// back to the status code when the body could not be read.
fn interpret<T>(
    status: StatusCode,
    ticker: &str,
    parsed: Result<T, UpstreamError>,
) -> Result<T, UpstreamError> {
    match parsed {
        Err(UpstreamError::Parse(_)) if status == StatusCode::NOT_FOUND => {
            Err(UpstreamError::NotFound(ticker.to_string()))
        }
        Err(UpstreamError::Parse(reason)) if !status.is_success() => Err(UpstreamError::Api {
            code: status.to_string(),
            description: reason,
        }),
        other => other,
    }
}

#[async_trait]
impl MarketData for External {
    async fn info(&self, ticker: &str) -> Result<InfoRecord, UpstreamError> {
        let crumb = self.crumb().await?;
        let url = self.endpoint(&["v10", "finance", "quoteSummary", ticker])?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("modules", yahoo::QUOTE_SUMMARY_MODULES.join(",").as_str()),
                ("crumb", crumb.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.forget_crumb().await;
            return Err(UpstreamError::Unauthorized);
        }
        let body = response.text().await?;
        interpret(status, ticker, yahoo::parse_quote_summary(&body, ticker))
    }

    async fn history(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, UpstreamError> {
        let url = self.endpoint(&["v8", "finance", "chart", ticker])?;
        let range: &str = period.as_ref();
        let response = self
            .client
            .get(url)
            .query(&[
                ("range", range),
                ("interval", "1d"),
                ("events", "div,splits"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret(status, ticker, yahoo::parse_chart(&body))
    }
}
