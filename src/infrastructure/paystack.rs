use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha512;

use crate::domain::errors::DomainError;
use crate::domain::ports::{InitiatePayment, PaymentGateway, PaymentVerification};

type HmacSha512 = Hmac<Sha512>;

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Constant-time check of a Paystack webhook signature: hex-encoded
/// HMAC-SHA-512 over the exact raw request bytes. Re-serialized JSON would
/// change the byte layout, so callers must pass the unparsed body.
pub fn signature_matches(secret: &str, raw_body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}

/// Paystack hosted-checkout client. Both calls are blocking and bounded by
/// the client timeout; failures surface as `GatewayUnavailable` and are never
/// retried here.
pub struct PaystackClient {
    http: reqwest::blocking::Client,
    base_url: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
}

impl PaystackClient {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, secret)
    }

    pub fn with_base_url(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            secret: secret.into(),
        }
    }

    fn unwrap_envelope<T>(&self, envelope: ApiEnvelope<T>) -> Result<T, DomainError> {
        if !envelope.status {
            return Err(DomainError::GatewayUnavailable(
                envelope
                    .message
                    .unwrap_or_else(|| "gateway reported failure".into()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| DomainError::GatewayUnavailable("gateway response missing data".into()))
    }
}

impl PaymentGateway for PaystackClient {
    fn initiate(&self, request: &InitiatePayment) -> Result<String, DomainError> {
        let body = json!({
            "email": request.email,
            "amount": request.amount_minor,
            "currency": request.currency,
            "reference": request.reference,
            "callback_url": request.callback_url,
        });

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret)
            .json(&body)
            .send()
            .map_err(gateway_error)?;

        if !response.status().is_success() {
            return Err(DomainError::GatewayUnavailable(format!(
                "initialize returned HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<InitializeData> = response.json().map_err(gateway_error)?;
        Ok(self.unwrap_envelope(envelope)?.authorization_url)
    }

    fn verify(&self, reference: &str) -> Result<PaymentVerification, DomainError> {
        let response = self
            .http
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret)
            .send()
            .map_err(gateway_error)?;

        if !response.status().is_success() {
            return Err(DomainError::GatewayUnavailable(format!(
                "verify returned HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<VerifyData> = response.json().map_err(gateway_error)?;
        let data = self.unwrap_envelope(envelope)?;
        Ok(PaymentVerification {
            status: data.status,
            gateway_ref: data.reference,
        })
    }

    fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        signature_matches(&self.secret, raw_body, signature)
    }
}

fn gateway_error(e: reqwest::Error) -> DomainError {
    DomainError::GatewayUnavailable(e.to_string())
}
