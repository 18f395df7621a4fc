//! Webhook delivery transport
//!
//! Every send fans out to the endpoints selected by tag. Endpoints are
//! independent: one failing never stops the others.

use crate::config::{EndpointConfig, WatchConfig};
use crate::errors::{delivery_error, rate_limited, transport_error, Result};
use crate::webhook::{role_mention_content, AllowedMentions, Webhook, MAX_COMPONENTS};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use verwatch_core::render::Component;
use verwatch_core::DeliveryBatch;

/// Longest wait honoured for a single rate limit
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);
const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);

/// Per-send tally of endpoint results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryOutcome {
    pub fn merge(self, other: DeliveryOutcome) -> DeliveryOutcome {
        DeliveryOutcome {
            delivered: self.delivered + other.delivered,
            failed: self.failed + other.failed,
        }
    }
}

/// Where announcements go
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one batch of reports to every endpoint
    async fn deliver(&self, batch: &DeliveryBatch) -> DeliveryOutcome;

    /// Send a ready-made payload to endpoints carrying `tag` (all when `None`)
    async fn notify(&self, webhook: &Webhook, tag: Option<&str>) -> DeliveryOutcome;
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    endpoints: BTreeMap<String, EndpointConfig>,
    link_buttons: bool,
}

impl WebhookSender {
    pub fn new(
        client: reqwest::Client,
        endpoints: BTreeMap<String, EndpointConfig>,
        link_buttons: bool,
    ) -> Self {
        Self {
            client,
            endpoints,
            link_buttons,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &WatchConfig) -> Self {
        Self::new(client, config.endpoints.clone(), config.link_buttons)
    }

    /// Payload of a report batch as seen by one endpoint
    ///
    /// # Errors
    ///
    /// - `InvalidInput` / `LimitExceeded`: the batch cannot form a webhook
    pub fn report_payload(&self, batch: &DeliveryBatch, endpoint: &EndpointConfig) -> Result<Webhook> {
        let mut builder = Webhook::builder().embeds(batch.embeds().cloned());

        builder = match role_mention_content(&endpoint.role_mentions) {
            Some(content) => builder
                .content(content)
                .allowed_mentions(AllowedMentions::roles(endpoint.role_mentions.iter().cloned())),
            None => builder.allowed_mentions(AllowedMentions::none()),
        };

        if self.link_buttons {
            builder = builder.components(Component::rows(batch.link_buttons(), MAX_COMPONENTS));
        }
        builder.build()
    }

    async fn post(&self, name: &str, endpoint: &EndpointConfig, webhook: &Webhook) -> Result<()> {
        let mut retried = false;
        loop {
            let response = self
                .client
                .post(endpoint.webhook_url.expose())
                .json(webhook)
                .send()
                .await
                .map_err(|e| transport_error(name, e))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if retried {
                    return Err(rate_limited(name));
                }
                let header_wait = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<f64>().ok());
                let body = response.text().await.unwrap_or_default();
                let wait = retry_wait(&body, header_wait);
                tracing::warn!(endpoint = name, wait_ms = wait.as_millis() as u64, "Rate limited, retrying once");
                tokio::time::sleep(wait).await;
                retried = true;
                continue;
            }
            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(delivery_error(name, status, &body));
            }
            return Ok(());
        }
    }

    async fn fan_out<F>(&self, tag: Option<&str>, payload: F) -> DeliveryOutcome
    where
        F: Fn(&EndpointConfig) -> Result<Webhook>,
    {
        let sends = self
            .endpoints
            .iter()
            .filter(|(_, endpoint)| endpoint.is_tagged(tag))
            .map(|(name, endpoint)| {
                let webhook = payload(endpoint);
                async move {
                    let result = match webhook {
                        Ok(webhook) => self.post(name, endpoint, &webhook).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = &result {
                        tracing::error!(
                            endpoint = name.as_str(),
                            err_code = e.code(),
                            error = %e,
                            "Failed to deliver webhook"
                        );
                    }
                    result.is_ok()
                }
            });

        join_all(sends)
            .await
            .into_iter()
            .fold(DeliveryOutcome::default(), |outcome, ok| {
                if ok {
                    DeliveryOutcome {
                        delivered: outcome.delivered + 1,
                        ..outcome
                    }
                } else {
                    DeliveryOutcome {
                        failed: outcome.failed + 1,
                        ..outcome
                    }
                }
            })
    }
}

/// Wait before the single retry: body `retry_after`, then the header, then 1s
fn retry_wait(body: &str, header_secs: Option<f64>) -> Duration {
    let secs = serde_json::from_str::<RateLimitBody>(body)
        .ok()
        .map(|b| b.retry_after)
        .or(header_secs);
    match secs {
        Some(secs) if secs.is_finite() && secs >= 0.0 => {
            Duration::from_secs_f64(secs.min(MAX_RETRY_WAIT.as_secs_f64()))
        }
        _ => DEFAULT_RETRY_WAIT,
    }
}

#[async_trait]
impl ReportSink for WebhookSender {
    async fn deliver(&self, batch: &DeliveryBatch) -> DeliveryOutcome {
        if batch.is_empty() {
            return DeliveryOutcome::default();
        }
        tracing::debug!(report_count = batch.len(), total_length = batch.total_length(), "Delivering batch");
        self.fan_out(None, |endpoint| self.report_payload(batch, endpoint))
            .await
    }

    async fn notify(&self, webhook: &Webhook, tag: Option<&str>) -> DeliveryOutcome {
        self.fan_out(tag, |_| Ok(webhook.clone())).await
    }
}
