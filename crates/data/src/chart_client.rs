//! HTTP candle source for Yahoo-style chart endpoints.
//!
//! Requests `{base_url}/{symbol}?range=..&interval=..` and reshapes the
//! columnar `chart.result[0]` payload into ascending candles. Rows without a
//! positive finite close are dropped.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use flowvalue_core::{Candle, CandleSource, SourceConfig, SourceError, Timeframe};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

pub struct ChartClient {
    http_client: Client,
    base_url: String,
    user_agent: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl ChartClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, requests_per_second: u32, user_agent: impl Into<String>) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.requests_per_second,
            config.user_agent.clone(),
        )
    }

    /// Builds the request URL for a symbol, percent-encoding it as a path segment.
    ///
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn chart_url(&self, symbol: &str, timeframe: Timeframe) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid chart base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("Chart base url cannot have path segments: {}", self.base_url))?
            .pop_if_empty()
            .push(symbol);

        let (range, interval) = timeframe.range_interval();
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval)
            .append_pair("includePrePost", "false")
            .append_pair("events", "div,splits");
        Ok(url)
    }
}

#[async_trait]
impl CandleSource for ChartClient {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let url = self.chart_url(symbol, timeframe)?;
        self.rate_limiter.until_ready().await;

        tracing::debug!(symbol, %timeframe, "Requesting chart");
        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Chart request failed for {symbol}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::upstream(status.as_u16(), &body).into());
        }

        let json: serde_json::Value = response.json().await?;
        Ok(parse_chart_response(symbol, json)?)
    }

    fn name(&self) -> &str {
        "chart"
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Converts a chart payload into ascending candles.
///
/// An empty result (no timestamps) yields an empty vector rather than an error.
///
/// # Errors
/// Returns [`SourceError::Malformed`] if the payload is not a chart envelope
/// or reports an upstream error.
pub fn parse_chart_response(symbol: &str, json: serde_json::Value) -> Result<Vec<Candle>, SourceError> {
    let envelope: ChartEnvelope =
        serde_json::from_value(json).map_err(|e| SourceError::malformed(symbol, e.to_string()))?;

    if let Some(error) = envelope.chart.error.filter(|e| !e.is_null()) {
        return Err(SourceError::malformed(symbol, error.to_string()));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten().unwrap_or(0.0);

    let mut candles: Vec<Candle> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &time)| {
            let close = quote.close.get(i).copied().flatten()?;
            if !close.is_finite() || close <= 0.0 {
                return None;
            }
            Some(Candle {
                time,
                open: column(&quote.open, i),
                high: column(&quote.high, i),
                low: column(&quote.low, i),
                close: Some(close),
                volume: column(&quote.volume, i),
            })
        })
        .collect();

    candles.sort_by_key(|c| c.time);
    Ok(candles)
}
