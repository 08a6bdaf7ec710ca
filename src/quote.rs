use crate::config::QuoteConfig;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quote service returned no quotes")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Fetches motivational quotes, falling back to a fixed line on any failure.
#[derive(Debug, Clone)]
pub struct QuoteSource {
    client: reqwest::Client,
    url: String,
    fallback: String,
}

impl QuoteSource {
    pub fn new(url: impl Into<String>, fallback: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &QuoteConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.fallback.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn fallback(&self) -> Quote {
        Quote {
            text: self.fallback.clone(),
            author: None,
        }
    }

    /// One random quote from the service.
    pub async fn fetch(&self) -> Result<Quote, QuoteError> {
        let quotes: Vec<Quote> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let usable: Vec<&Quote> = quotes.iter().filter(|q| !q.text.trim().is_empty()).collect();
        usable
            .choose(&mut rand::thread_rng())
            .map(|quote| (*quote).clone())
            .ok_or(QuoteError::Empty)
    }

    pub async fn quote_or_fallback(&self) -> Quote {
        match self.fetch().await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(%err, "using fallback quote");
                self.fallback()
            }
        }
    }
}
