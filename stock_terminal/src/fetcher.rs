//! Fetching a single symbol's quote over HTTP.
//!
//! `QuoteSource` is the seam between the aggregator and the network: one call,
//! one symbol, one definitive outcome. `FinnhubClient` implements it with
//! `reqwest`. A failed call never panics and never retries; it returns a
//! `FetchError` naming the symbol and the cause, and the next scheduled cycle is
//! the retry.
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Request};
use stock_common::TerminalError;
use stock_common::endpoint::quote_url;
use stock_common::quote::{Quote, RawQuote};
use stock_common::symbols::Symbol;
use thiserror::Error;

const USER_AGENT: &str = concat!("stock_terminal/", env!("CARGO_PKG_VERSION"));

/// Why a single symbol could not be fetched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchCause {
    /// Connection, DNS or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The body was not a JSON quote object.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// No answer within the fetch bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Failed fetch for one symbol.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{symbol}: {cause}")]
pub struct FetchError {
    /// Symbol that failed.
    pub symbol: Symbol,
    /// What went wrong.
    pub cause: FetchCause,
}

impl FetchError {
    /// Failure of `symbol` with `cause`.
    pub fn new(symbol: Symbol, cause: FetchCause) -> Self {
        FetchError { symbol, cause }
    }
}

/// Anything that can produce the latest quote for a symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch and normalize the quote for `symbol`.
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError>;
}

/// `QuoteSource` backed by the Finnhub `/quote` endpoint.
pub struct FinnhubClient {
    http: Client,
    quote_url: String,
    api_key: String,
    timeout: Duration,
}

impl FinnhubClient {
    /// Build a client for `base_url`, authenticating with `api_key`. Every
    /// request is bounded by `timeout`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, TerminalError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TerminalError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(FinnhubClient {
            http,
            quote_url: quote_url(base_url),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    fn request(&self, symbol: &Symbol) -> reqwest::Result<Request> {
        self.http
            .get(&self.quote_url)
            .query(&[("symbol", symbol.as_str()), ("token", self.api_key.as_str())])
            .build()
    }

    fn transport_error(&self, symbol: &Symbol, err: reqwest::Error) -> FetchError {
        let cause = if err.is_timeout() {
            FetchCause::Timeout(self.timeout)
        } else {
            // The URL carries the token.
            FetchCause::Transport(err.without_url().to_string())
        };
        FetchError::new(symbol.clone(), cause)
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let request = self
            .request(symbol)
            .map_err(|e| self.transport_error(symbol, e))?;
        debug!("GET {} symbol={}", self.quote_url, symbol);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| self.transport_error(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                symbol.clone(),
                FetchCause::Status(status.as_u16()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(symbol, e))?;
        let raw = RawQuote::from_json_bytes(&body).map_err(|e| {
            FetchError::new(symbol.clone(), FetchCause::Malformed(e.to_string()))
        })?;

        Ok(Quote::from_raw(symbol.clone(), raw))
    }
}
