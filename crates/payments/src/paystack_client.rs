use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

const PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

// Paystack calls must never hang a request handler indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal Paystack client built on reqwest.
pub struct PaystackClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
    callback_url: String,
}

/// Hosted checkout session handed back by `transaction/initialize`.
#[derive(Debug, Clone)]
pub struct PaystackSession {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

/// Authoritative answer from `transaction/verify`. `succeeded` is true only
/// for Paystack's terminal `success` status; everything else is a failure.
#[derive(Debug, Clone)]
pub struct PaystackConfirmation {
    pub succeeded: bool,
    pub raw_status: String,
    pub amount_minor: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope<T> {
    status: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: Option<String>,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    amount: Option<i64>,
}

impl PaystackClient {
    pub fn new(secret_key: String, callback_url: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            secret_key,
            base_url: PAYSTACK_BASE_URL.to_string(),
            callback_url,
        })
    }

    /// Converts an amount to Paystack's minor unit (kobo): multiply by 100,
    /// truncate.
    pub fn to_minor_units(amount: Decimal) -> Result<i64> {
        (amount * Decimal::from(100)).trunc().to_i64().ok_or_else(|| {
            anyhow::anyhow!("amount {} does not fit the gateway minor unit range", amount)
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        #[derive(Debug, Deserialize)]
        struct PaystackErrorEnvelope {
            message: Option<String>,
            code: Option<String>,
        }

        let (paystack_error_message, paystack_error_code) =
            match serde_json::from_str::<PaystackErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.message, envelope.code),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            paystack_error_message = ?paystack_error_message,
            paystack_error_code = ?paystack_error_code,
            response_body = %body,
            context = %context,
            "paystack api request failed"
        );

        anyhow::bail!(
            "Paystack API request failed: {} (status {})",
            context,
            status
        );
    }

    /// Creates a hosted checkout session and returns its redirect URL.
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount: Decimal,
        reference: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaystackSession> {
        // https://paystack.com/docs/api/transaction/#initialize
        let amount_minor = Self::to_minor_units(amount)?;
        let body = json!({
            "email": email,
            "amount": amount_minor,
            "reference": reference,
            "currency": "NGN",
            "callback_url": self.callback_url,
            "metadata": metadata,
        });

        let resp = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "initialize transaction").await?;

        let envelope: PaystackEnvelope<InitializeData> = resp.json().await?;
        if !envelope.status {
            warn!(
                reference,
                message = ?envelope.message,
                "paystack refused to initialize transaction"
            );
            anyhow::bail!(
                "Paystack refused to initialize transaction: {}",
                envelope.message.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        let data = envelope
            .data
            .ok_or_else(|| anyhow::anyhow!("Paystack initialize response is missing data"))?;

        info!(reference, "paystack transaction initialized");

        Ok(PaystackSession {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    /// Fetches the authoritative transaction status for a reference.
    pub async fn verify_transaction(&self, reference: &str) -> Result<PaystackConfirmation> {
        // https://paystack.com/docs/api/transaction/#verify
        let resp = self
            .http
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "verify transaction").await?;

        let envelope: PaystackEnvelope<VerifyData> = resp.json().await?;
        if !envelope.status {
            warn!(
                reference,
                message = ?envelope.message,
                "paystack could not verify transaction"
            );
            anyhow::bail!(
                "Paystack could not verify transaction: {}",
                envelope.message.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        let data = envelope
            .data
            .ok_or_else(|| anyhow::anyhow!("Paystack verify response is missing data"))?;

        info!(reference, raw_status = %data.status, "paystack transaction verified");

        Ok(PaystackConfirmation {
            succeeded: data.status == "success",
            raw_status: data.status,
            amount_minor: data.amount,
        })
    }
}
