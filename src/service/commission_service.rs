// service/commission_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    db::{
        commissiondb::CommissionExt, notificationdb::NotificationExt,
        subscriptiondb::SubscriptionExt, userdb::UserExt, CommissionStore,
    },
    models::notificationmodel::NotificationType,
    service::{
        error::ServiceError,
        payout_service::{PayoutOutcome, PayoutService},
        stripe::PaymentProvider,
    },
    utils::currency::from_minor_units,
};

const PAYMENT_PROVIDER: &str = "stripe";

/// Turns a confirmed provider payment into ledger state: subscription upsert,
/// idempotent commission insert, best-effort auto-payout, notification queue.
pub struct CommissionService {
    db_client: Arc<dyn CommissionStore>,
    provider: Arc<dyn PaymentProvider>,
    commission_fee: f64,
    commission_currency: String,
}

impl CommissionService {
    pub fn new(
        db_client: Arc<dyn CommissionStore>,
        provider: Arc<dyn PaymentProvider>,
        commission_fee: f64,
        commission_currency: String,
    ) -> Self {
        Self {
            db_client,
            provider,
            commission_fee,
            commission_currency,
        }
    }

    /// Handle an `invoice.payment_succeeded` event object. Early successful
    /// returns (unknown payer, no referrer, already recorded) are no-ops by
    /// design; only database failures on the ledger write propagate.
    pub async fn process_payment_succeeded(
        &self,
        invoice: &Value,
        auto_payout_enabled: bool,
    ) -> Result<(), ServiceError> {
        let invoice_id = invoice["id"]
            .as_str()
            .ok_or_else(|| ServiceError::InvalidPayload("invoice is missing id".to_string()))?;
        let customer_id = invoice["customer"].as_str().ok_or_else(|| {
            ServiceError::InvalidPayload("invoice is missing customer".to_string())
        })?;

        let customer = self.provider.get_customer(customer_id).await?;
        let Some(email) = customer.email else {
            tracing::warn!("Customer {} has no email, skipping invoice {}", customer_id, invoice_id);
            return Ok(());
        };

        let Some(user) = self.db_client.get_user_by_email(&email).await? else {
            tracing::info!("No user matches payer email for invoice {}, skipping", invoice_id);
            return Ok(());
        };

        if let Some(subscription_id) = invoice["subscription"].as_str() {
            let amount_paid = invoice["amount_paid"].as_i64().unwrap_or(0);
            let currency = invoice["currency"].as_str().unwrap_or("usd");
            let (period_start, period_end) = billing_period(invoice);

            self.db_client
                .upsert_subscription(
                    user.id,
                    subscription_id,
                    "active",
                    from_minor_units(amount_paid),
                    currency,
                    period_start,
                    period_end,
                )
                .await?;
        }

        let Some(referrer_id) = user.referrer_id else {
            tracing::debug!("User {} has no referrer, no commission owed", user.id);
            return Ok(());
        };

        // Idempotency guard: provider redeliveries of the same invoice must
        // not produce a second ledger row.
        if let Some(existing) = self
            .db_client
            .get_commission_by_transfer_ref(invoice_id)
            .await?
        {
            tracing::info!(
                "Commission {} already recorded for invoice {}, skipping",
                existing.id,
                invoice_id
            );
            return Ok(());
        }

        let commission = self
            .db_client
            .create_commission(
                referrer_id,
                user.id,
                self.commission_fee,
                &self.commission_currency,
                PAYMENT_PROVIDER,
                invoice_id,
            )
            .await?;

        tracing::info!(
            "Recorded commission {} of {} {} for referrer {} (invoice {})",
            commission.id,
            commission.amount,
            commission.currency,
            referrer_id,
            invoice_id
        );

        let referrer = self.db_client.get_user_by_id(referrer_id).await?;

        let payout_service = PayoutService::new(self.db_client.clone(), self.provider.clone());
        let outcome = match &referrer {
            Some(referrer) => {
                payout_service
                    .attempt_auto_payout(&commission, referrer, auto_payout_enabled)
                    .await
            }
            None => {
                tracing::warn!(
                    "Referrer {} not found for commission {}, payout skipped",
                    referrer_id,
                    commission.id
                );
                PayoutOutcome::Pending
            }
        };

        let notification_type = match outcome {
            PayoutOutcome::Paid { .. } => NotificationType::PayoutCompleted,
            PayoutOutcome::Pending => NotificationType::CommissionEarned,
        };
        let payout_method = referrer
            .as_ref()
            .map(|r| r.payout_method())
            .unwrap_or("none");

        // Notification queuing is best-effort; the ledger write above is the
        // only must-succeed operation in this flow.
        if let Err(e) = self
            .db_client
            .queue_notification(
                referrer_id,
                notification_type,
                self.commission_fee,
                &self.commission_currency,
                &user.name,
                payout_method,
            )
            .await
        {
            tracing::error!(
                "Failed to queue {} notification for referrer {}: {}",
                notification_type.to_str(),
                referrer_id,
                e
            );
        }

        Ok(())
    }
}

/// Billing period bounds from the first invoice line, as epoch seconds.
fn billing_period(invoice: &Value) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let period = &invoice["lines"]["data"][0]["period"];
    let to_datetime = |v: &Value| v.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0));
    (to_datetime(&period["start"]), to_datetime(&period["end"]))
}
