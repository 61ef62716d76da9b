use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::fulfillment::FulfillmentService;
use crate::domain::order::ContactDetails;
use crate::errors::AppError;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutItem {
    /// Ticket-type code from the price table, e.g. "VIP"
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub qty: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateTransactionRequest {
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    pub items: Vec<CheckoutItem>,
    pub success_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InitiateTransactionResponse {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub ok: bool,
    pub status: String,
    pub order_ref: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/payments/initiate-transaction
///
/// Validates the cart, persists a PENDING order, and returns the gateway's
/// hosted-checkout URL together with our order reference.
#[utoipa::path(
    post,
    path = "/api/payments/initiate-transaction",
    request_body = InitiateTransactionRequest,
    responses(
        (status = 200, description = "Checkout initiated", body = InitiateTransactionResponse),
        (status = 400, description = "Invalid cart or missing fields"),
        (status = 502, description = "Payment gateway unavailable"),
    ),
    tag = "payments"
)]
pub async fn initiate_transaction(
    service: web::Data<FulfillmentService>,
    body: web::Json<InitiateTransactionRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let accepted = web::block(move || {
        let contact = ContactDetails {
            email: body.email,
            full_name: body.full_name,
            phone: body.phone,
            country: body.country,
            company: body.company,
        };
        let items: Vec<(String, i32)> = body
            .items
            .into_iter()
            .map(|i| (i.ticket_type, i.qty))
            .collect();
        service.initiate_order(contact, &items, body.success_url)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(InitiateTransactionResponse {
        authorization_url: accepted.authorization_url,
        reference: accepted.order_ref,
    }))
}

/// POST /api/payments/verify-payment
///
/// Client-driven verification after the hosted checkout redirects back.
/// Idempotent; reports the order's current status either way.
#[utoipa::path(
    post,
    path = "/api/payments/verify-payment",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Current payment state", body = VerifyPaymentResponse),
        (status = 404, description = "Unknown order reference"),
        (status = 502, description = "Payment gateway unavailable"),
    ),
    tag = "payments"
)]
pub async fn verify_payment(
    service: web::Data<FulfillmentService>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let reference = body.into_inner().reference;

    let state = web::block(move || service.confirm_payment(&reference))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        ok: true,
        status: state.status.as_str().to_string(),
        order_ref: state.order_ref,
    }))
}

/// POST /api/payments/webhook
///
/// Receives the gateway's asynchronous events. The body is taken as raw
/// bytes so the HMAC is computed over exactly what was sent; parsing happens
/// only after the signature checks out. Kept out of the OpenAPI annotations:
/// the raw `Bytes` body has no schema to document.
pub async fn webhook(
    service: web::Data<FulfillmentService>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    web::block(move || service.handle_webhook(&body, &signature))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().body("ok"))
}
