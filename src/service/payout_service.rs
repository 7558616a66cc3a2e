// service/payout_service.rs
use std::sync::Arc;

use crate::{
    db::{commissiondb::CommissionExt, CommissionStore},
    models::{commissionmodel::Commission, usermodel::User},
    service::stripe::PaymentProvider,
    utils::currency::to_minor_units,
};

#[derive(Debug, PartialEq)]
pub enum PayoutOutcome {
    Paid { transfer_id: String },
    Pending,
}

/// Best-effort instant payout of a freshly written commission. Every failure
/// path degrades to `Pending`; the ledger row is the durable fact and is
/// never rolled back from here.
pub struct PayoutService {
    db_client: Arc<dyn CommissionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl PayoutService {
    pub fn new(db_client: Arc<dyn CommissionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            db_client,
            provider,
        }
    }

    pub async fn attempt_auto_payout(
        &self,
        commission: &Commission,
        referrer: &User,
        auto_payout_enabled: bool,
    ) -> PayoutOutcome {
        if !auto_payout_enabled {
            tracing::debug!(
                "Auto-payout disabled, commission {} stays pending",
                commission.id
            );
            return PayoutOutcome::Pending;
        }

        let Some(account_id) = referrer.stripe_connect_id.as_deref() else {
            tracing::debug!(
                "Referrer {} has no connected payout account, commission {} stays pending",
                referrer.id,
                commission.id
            );
            return PayoutOutcome::Pending;
        };

        match self.provider.account_can_receive_payouts(account_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    "Connected account {} cannot receive payouts yet, commission {} stays pending",
                    account_id,
                    commission.id
                );
                return PayoutOutcome::Pending;
            }
            Err(e) => {
                tracing::warn!(
                    "Capability check failed for account {}: {}. Commission {} stays pending",
                    account_id,
                    e,
                    commission.id
                );
                return PayoutOutcome::Pending;
            }
        }

        let amount_minor = to_minor_units(commission.amount);
        let transfer_id = match self
            .provider
            .create_transfer(amount_minor, &commission.currency, account_id, commission.id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    "Transfer to {} failed: {}. Commission {} left pending for manual settlement",
                    account_id,
                    e,
                    commission.id
                );
                return PayoutOutcome::Pending;
            }
        };

        tracing::info!(
            "Transfer {} of {} {} sent to account {} for commission {}",
            transfer_id,
            commission.amount,
            commission.currency,
            account_id,
            commission.id
        );

        // The money has moved. A failed ledger update here must not hide
        // that, so the outcome is still Paid and the row is reconciled
        // manually against the transfer metadata.
        if let Err(e) = self
            .db_client
            .mark_commission_paid(commission.id, &transfer_id)
            .await
        {
            tracing::error!(
                "Transfer {} succeeded but commission {} could not be marked paid: {}",
                transfer_id,
                commission.id,
                e
            );
        }

        PayoutOutcome::Paid { transfer_id }
    }
}
