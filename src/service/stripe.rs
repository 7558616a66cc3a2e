// service/stripe.rs
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{config::Config, service::error::ServiceError};

/// Webhook signatures older than this are rejected to limit replay windows.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Serialize, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Outbound calls the ledger and payout flows make against the payment
/// provider. StripeClient is the live implementation; tests script one.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> Result<StripeCustomer, ServiceError>;

    /// Live capability check on a connected account. Presence of an account
    /// id is not enough; the account must have payouts enabled and an active
    /// transfers capability.
    async fn account_can_receive_payouts(&self, account_id: &str) -> Result<bool, ServiceError>;

    /// Instant transfer to a connected account, tagged with the commission id
    /// for traceability. Amount is in minor units.
    async fn create_transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
        commission_id: Uuid,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            secret_key: config.stripe_secret_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
        }
    }

    /// Verify a `stripe-signature` header (`t=<ts>,v1=<hex hmac>`) against the
    /// raw request body. Returns Ok(false) for a well-formed but wrong or
    /// expired signature, Err for a malformed header.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<bool, ServiceError> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            ServiceError::InvalidPayload("signature header missing timestamp".to_string())
        })?;
        if candidates.is_empty() {
            return Err(ServiceError::InvalidPayload(
                "signature header missing v1 signature".to_string(),
            ));
        }

        let timestamp_secs: i64 = timestamp.parse().map_err(|_| {
            ServiceError::InvalidPayload("signature timestamp is not a number".to_string())
        })?;

        let age = chrono::Utc::now().timestamp() - timestamp_secs;
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            return Ok(false);
        }

        let mut mac = Hmac::<Sha256>::new_from_slice(self.webhook_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison against every v1 candidate
        Ok(candidates
            .iter()
            .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn get_customer(&self, customer_id: &str) -> Result<StripeCustomer, ServiceError> {
        let client = reqwest::Client::new();
        let url = format!("{}/customers/{}", STRIPE_API_BASE, customer_id);

        let response = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(ServiceError::Provider(
                error["message"]
                    .as_str()
                    .unwrap_or("customer retrieval failed")
                    .to_string(),
            ));
        }

        Ok(StripeCustomer {
            id: body["id"].as_str().unwrap_or_default().to_string(),
            email: body["email"].as_str().map(|s| s.to_string()),
            name: body["name"].as_str().map(|s| s.to_string()),
        })
    }

    async fn account_can_receive_payouts(&self, account_id: &str) -> Result<bool, ServiceError> {
        let client = reqwest::Client::new();
        let url = format!("{}/accounts/{}", STRIPE_API_BASE, account_id);

        let response = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(ServiceError::Provider(
                error["message"]
                    .as_str()
                    .unwrap_or("account retrieval failed")
                    .to_string(),
            ));
        }

        let payouts_enabled = body["payouts_enabled"].as_bool().unwrap_or(false);
        let transfers_active = body["capabilities"]["transfers"].as_str() == Some("active");

        Ok(payouts_enabled && transfers_active)
    }

    async fn create_transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
        commission_id: Uuid,
    ) -> Result<String, ServiceError> {
        let params = vec![
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("destination", destination.to_string()),
            ("metadata[commission_id]", commission_id.to_string()),
        ];
        let form_body = serde_urlencoded::to_string(&params)
            .map_err(|e| ServiceError::Provider(e.to_string()))?;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/transfers", STRIPE_API_BASE))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form_body)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(ServiceError::Provider(
                error["message"]
                    .as_str()
                    .unwrap_or("transfer creation failed")
                    .to_string(),
            ));
        }

        body["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ServiceError::Provider("transfer response missing id".to_string()))
    }
}
