// handler/webhook.rs
use std::sync::Arc;

use axum::{http::HeaderMap, response::IntoResponse, Extension, Json};

use crate::{
    db::settingsdb::SettingsExt,
    dtos::webhookdtos::WebhookAck,
    error::{ErrorMessage, HttpError},
    service::commission_service::CommissionService,
    AppState,
};

/// Stripe webhook intake. Fails closed on any signature problem before any
/// side effect; Stripe's own retry policy governs redelivery, so nothing is
/// retried here.
pub async fn stripe_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, HttpError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::MissingSignature.to_string()))?;

    // Verification runs over the raw body, before any JSON parsing
    let verified = app_state
        .stripe
        .verify_webhook_signature(body.as_bytes(), signature)
        .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidSignature.to_string()))?;

    if !verified {
        tracing::warn!("Invalid Stripe webhook signature received");
        return Err(HttpError::bad_request(
            ErrorMessage::InvalidSignature.to_string(),
        ));
    }

    let event: serde_json::Value = serde_json::from_str(&body)
        .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidEventPayload.to_string()))?;

    let event_type = event["type"]
        .as_str()
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::InvalidEventPayload.to_string()))?;

    match event_type {
        "invoice.payment_succeeded" => {
            let auto_payout_enabled = app_state
                .db_client
                .is_auto_payout_enabled()
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            let commission_service = CommissionService::new(
                app_state.db_client.clone(),
                app_state.stripe.clone(),
                app_state.env.commission_fee,
                app_state.env.commission_currency.clone(),
            );

            commission_service
                .process_payment_succeeded(&event["data"]["object"], auto_payout_enabled)
                .await
                .map_err(HttpError::from)?;
        }
        other => {
            tracing::info!("Unhandled Stripe webhook event: {}", other);
        }
    }

    Ok(Json(WebhookAck::ok()))
}
