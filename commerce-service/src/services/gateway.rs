//! Stripe Checkout Sessions client.
//!
//! The gateway is only ever asked one thing: turn a list of line items into a
//! hosted checkout page and hand back the redirect URL.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::dtos::payments::CheckoutItem;

/// A created checkout session: opaque gateway id plus the URL the client is
/// redirected to.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        items: &[CheckoutItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession>;
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

/// Successful response body, reduced to the fields this service reads.
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        items: &[CheckoutItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        // Stripe's form encoding: nested params spelled out with bracketed keys.
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("locale".to_string(), "en".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
        ];

        for (i, item) in items.iter().enumerate() {
            form.push((
                format!("line_items[{}][price_data][currency]", i),
                item.currency.to_lowercase(),
            ));
            form.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.product_name.clone(),
            ));
            form.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                // amount arrives in major units; Stripe wants the smallest unit
                ((item.amount * 100.0).round() as i64).to_string(),
            ));
            form.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
        }

        let url = format!("{}/v1/checkout/sessions", self.config.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Stripe create session response");

        if status.is_success() {
            let session: StripeSession = serde_json::from_str(&body)?;
            let redirect = session
                .url
                .ok_or_else(|| anyhow!("Stripe session created without a redirect URL"))?;
            tracing::info!(session_id = %session.id, "Stripe checkout session created");
            Ok(CheckoutSession {
                id: session.id,
                url: redirect,
            })
        } else {
            let detail = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.error.error_type.unwrap_or_else(|| "unknown".to_string()),
                        e.error.message.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|_| format!("HTTP {}", status));
            tracing::warn!(status = %status, "Stripe checkout session creation failed");
            Err(anyhow!("Stripe error: {}", detail))
        }
    }
}

/// Test gateway: counts calls, optionally fails.
#[derive(Default)]
pub struct MockGateway {
    pub fail: AtomicBool,
    pub calls: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        items: &[CheckoutItem],
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("mock gateway failure"));
        }
        Ok(CheckoutSession {
            id: format!("cs_test_{}", call),
            url: format!("https://checkout.stripe.test/pay/cs_test_{}?items={}", call, items.len()),
        })
    }
}
