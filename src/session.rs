use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{self, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parser::rows::read_rows;
use crate::parser::SourceRow;
use crate::settings::Settings;

const MAX_BACKOFF: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no table rows appeared within {secs}s")]
    Timeout { secs: u64 },
    #[error("page returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl SourceError {
    /// Worth another attempt before the presence deadline.
    fn is_transient(&self) -> bool {
        match self {
            SourceError::Status(code) => *code == 429 || (500..600).contains(code),
            SourceError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            SourceError::Timeout { .. } => false,
        }
    }
}

/// An open page session. Dropping it logs the close and frees the HTTP
/// client with its pooled connections; there is no other teardown.
pub struct PageSession {
    client: reqwest::Client,
    presence_timeout: Duration,
    poll_interval: Duration,
}

impl PageSession {
    pub fn open(settings: &Settings) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()?;

        info!("Page session opened");
        Ok(Self {
            client,
            presence_timeout: settings.presence_timeout(),
            poll_interval: settings.poll_interval(),
        })
    }

    /// Load `url` until its table has at least one body row, or give up once
    /// the presence timeout has passed.
    pub async fn wait_for_rows(&self, url: &str) -> Result<Vec<SourceRow>, SourceError> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner());
        pb.set_message(format!("Waiting for coin rows at {}", url));
        pb.enable_steady_tick(Duration::from_millis(120));

        let outcome = tokio::time::timeout(self.presence_timeout, self.poll_rows(url, &pb)).await;
        pb.finish_and_clear();

        match outcome {
            Ok(rows) => rows,
            Err(_) => Err(SourceError::Timeout {
                secs: self.presence_timeout.as_secs(),
            }),
        }
    }

    async fn poll_rows(&self, url: &str, pb: &ProgressBar) -> Result<Vec<SourceRow>, SourceError> {
        let mut failures = 0u32;
        loop {
            let delay = match self.fetch_page(url).await {
                Ok(html) => {
                    let rows = read_rows(&html);
                    if !rows.is_empty() {
                        info!("Found {} table rows", rows.len());
                        return Ok(rows);
                    }
                    debug!("No table rows yet at {}", url);
                    failures = 0;
                    self.poll_interval
                }
                Err(e) if e.is_transient() => {
                    let backoff = self.backoff(failures);
                    failures += 1;
                    warn!("Fetch failed ({}), retrying in {:.1}s", e, backoff.as_secs_f64());
                    backoff
                }
                Err(e) => return Err(e),
            };
            pb.tick();
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, SourceError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }

    fn backoff(&self, failures: u32) -> Duration {
        self.poll_interval
            .saturating_mul(2u32.saturating_pow(failures))
            .min(MAX_BACKOFF)
    }
}

/// Rows from the live page. A page that never shows rows is not an error
/// here: the run continues with nothing to extract.
pub async fn fetch_rows(settings: &Settings) -> anyhow::Result<Vec<SourceRow>> {
    let session = PageSession::open(settings)?;
    info!("Connecting to {}", settings.url);
    match session.wait_for_rows(&settings.url).await {
        Ok(rows) => Ok(rows),
        Err(SourceError::Timeout { secs }) => {
            warn!("Timed out after {}s waiting for coin rows", secs);
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        info!("Page session closed");
    }
}
