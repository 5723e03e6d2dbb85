use std::collections::HashMap;

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Minimal Stripe client built on reqwest. Only the self-service billing
/// calls are covered; webhooks are verified by `webhook_signature`.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

/// Parameters for a subscription-mode Checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionParams {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (stripe_error_type, stripe_error_code, stripe_error_param, stripe_error_message) =
            match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.type_, details.code, details.param, details.message)
                }
                Err(_) => (None, None, None, None),
            };

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?stripe_error_type,
            stripe_error_code = ?stripe_error_code,
            stripe_error_param = ?stripe_error_param,
            stripe_error_message = ?stripe_error_message,
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    async fn post_form(&self, path: &str, body: &[(String, String)], context: &str) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body)
            .send()
            .await?;

        Self::ensure_success(resp, context).await
    }

    /// Creates a Stripe customer tagged with the app slug and local user id.
    pub async fn create_customer(&self, app_slug: &str, user_id: &str, email: Option<&str>) -> Result<String> {
        // https://stripe.com/docs/api/customers/create
        let mut body = vec![
            ("metadata[app]".to_string(), app_slug.to_string()),
            ("metadata[userId]".to_string(), user_id.to_string()),
        ];
        if let Some(email) = email {
            body.push(("email".to_string(), email.to_string()));
        }

        let resp = self.post_form("/v1/customers", &body, "create customer").await?;

        #[derive(Deserialize)]
        struct CustomerResp {
            id: String,
        }

        let parsed: CustomerResp = resp.json().await?;
        Ok(parsed.id)
    }

    /// Creates a subscription-mode Checkout Session and returns its URL.
    pub async fn create_checkout_session(&self, params: CheckoutSessionParams) -> Result<String> {
        // https://stripe.com/docs/payments/checkout
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("customer".to_string(), params.customer_id),
            ("success_url".to_string(), params.success_url),
            ("cancel_url".to_string(), params.cancel_url),
            ("line_items[0][price]".to_string(), params.price_id),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        let mut metadata: Vec<_> = params.metadata.into_iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            body.push((format!("metadata[{}]", key), value));
        }

        let resp = self
            .post_form("/v1/checkout/sessions", &body, "create checkout session")
            .await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            url: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))
    }

    /// Opens a customer billing-portal session and returns its URL.
    pub async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> Result<String> {
        // https://stripe.com/docs/api/customer_portal/sessions/create
        let body = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];

        let resp = self
            .post_form("/v1/billing_portal/sessions", &body, "create portal session")
            .await?;

        #[derive(Deserialize)]
        struct PortalResp {
            url: String,
        }

        let parsed: PortalResp = resp.json().await?;
        Ok(parsed.url)
    }
}
