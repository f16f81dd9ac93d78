//! HTTP settlement gateway against a mint-style REST API.
//!
//! Transport failures, non-success statuses, and malformed payloads all map
//! to `ServiceError::Upstream`; callers treat them as retryable.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, ServiceError};

use super::{QuoteResponse, QuoteState, SettlementGateway};

pub struct HttpSettlementGateway {
    http: reqwest::Client,
    base_url: String,
    unit: String,
}

/// Wire shape of the upstream quote endpoints.
#[derive(Debug, Deserialize)]
struct WireQuote {
    quote: String,
    #[serde(default)]
    request: String,
    #[serde(default)]
    amount: Option<u64>,
    #[serde(default)]
    unit: Option<String>,
    state: String,
    #[serde(default)]
    expiry: Option<i64>,
}

impl HttpSettlementGateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            unit: unit.into(),
        }
    }

    fn quote_url(&self) -> String {
        format!("{}/v1/mint/quote/bolt11", self.base_url)
    }
}

#[async_trait]
impl SettlementGateway for HttpSettlementGateway {
    async fn create_quote(&self, amount: u64, memo: &str) -> Result<QuoteResponse> {
        let body = json!({
            "amount": amount,
            "unit": self.unit,
            "description": memo,
        });
        let response = self
            .http
            .post(self.quote_url())
            .json(&body)
            .send()
            .await
            .map_err(|err| ServiceError::upstream(format!("quote request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::upstream(format!(
                "quote request rejected ({})",
                response.status().as_u16()
            )));
        }

        let wire: WireQuote = response
            .json()
            .await
            .map_err(|err| ServiceError::upstream(format!("quote response malformed: {err}")))?;

        Ok(QuoteResponse {
            quote_id: wire.quote,
            request: wire.request,
            amount: wire.amount.unwrap_or(amount),
            unit: wire.unit.unwrap_or_else(|| self.unit.clone()),
            state: wire.state,
            expiry: wire.expiry,
        })
    }

    async fn check_quote(&self, quote_id: &str) -> Result<QuoteState> {
        let url = format!("{}/{quote_id}", self.quote_url());
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ServiceError::upstream(format!("quote state fetch failed: {err}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::upstream(format!(
                "quote state fetch rejected ({})",
                response.status().as_u16()
            )));
        }

        let wire: WireQuote = response
            .json()
            .await
            .map_err(|err| ServiceError::upstream(format!("quote state malformed: {err}")))?;

        Ok(QuoteState { state: wire.state })
    }
}
