// service/test_support.rs
//! In-memory doubles for the storage, payment-provider and mail seams.
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{
        commissiondb::CommissionExt, digestdb::DigestRunExt, notificationdb::NotificationExt,
        subscriptiondb::SubscriptionExt, userdb::UserExt,
    },
    mail::mails::DigestMailer,
    models::{
        commissionmodel::{Commission, CommissionStatus},
        notificationmodel::{NotificationType, PendingCommissionNotification},
        subscriptionmodel::Subscription,
        usermodel::User,
    },
    service::{
        error::ServiceError,
        stripe::{PaymentProvider, StripeCustomer},
    },
};

pub fn test_user(
    id: Uuid,
    referrer_id: Option<Uuid>,
    email: &str,
    stripe_connect_id: Option<&str>,
) -> User {
    User {
        id,
        name: format!("User {}", &email[..email.find('@').unwrap_or(0)]),
        email: email.to_string(),
        referrer_id,
        stripe_connect_id: stripe_connect_id.map(|s| s.to_string()),
        paypal_email: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

/// Vec-backed stand-in for the Postgres pool. Implements every storage
/// extension trait, so the blanket store impls cover it.
#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<User>>,
    pub commissions: Mutex<Vec<Commission>>,
    pub subscriptions: Mutex<Vec<Subscription>>,
    pub notifications: Mutex<Vec<PendingCommissionNotification>>,
    pub lease_busy: Mutex<bool>,
}

impl MemoryStore {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl CommissionExt for MemoryStore {
    async fn get_commission_by_transfer_ref(
        &self,
        provider_transfer_id: &str,
    ) -> Result<Option<Commission>, sqlx::Error> {
        Ok(self
            .commissions
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.provider_transfer_id == provider_transfer_id)
            .cloned())
    }

    async fn create_commission(
        &self,
        referrer_id: Uuid,
        referred_user_id: Uuid,
        amount: f64,
        currency: &str,
        payment_provider: &str,
        provider_transfer_id: &str,
    ) -> Result<Commission, sqlx::Error> {
        let commission = Commission {
            id: Uuid::new_v4(),
            referrer_id,
            referred_user_id,
            amount,
            currency: currency.to_string(),
            status: CommissionStatus::Pending,
            payment_provider: payment_provider.to_string(),
            provider_transfer_id: provider_transfer_id.to_string(),
            created_at: Some(Utc::now()),
            paid_at: None,
        };
        self.commissions.lock().unwrap().push(commission.clone());
        Ok(commission)
    }

    async fn mark_commission_paid(
        &self,
        commission_id: Uuid,
        transfer_id: &str,
    ) -> Result<Commission, sqlx::Error> {
        let mut commissions = self.commissions.lock().unwrap();
        let commission = commissions
            .iter_mut()
            .find(|c| c.id == commission_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        commission.status = CommissionStatus::Paid;
        commission.paid_at = Some(Utc::now());
        commission.provider_transfer_id = transfer_id.to_string();
        Ok(commission.clone())
    }
}

#[async_trait]
impl SubscriptionExt for MemoryStore {
    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        provider_subscription_id: &str,
        status: &str,
        amount: f64,
        currency: &str,
        current_period_start: Option<DateTime<Utc>>,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Subscription, sqlx::Error> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.provider_subscription_id == provider_subscription_id)
        {
            existing.status = status.to_string();
            existing.amount = amount;
            existing.currency = currency.to_string();
            existing.current_period_start = current_period_start;
            existing.current_period_end = current_period_end;
            existing.updated_at = Some(Utc::now());
            return Ok(existing.clone());
        }
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            status: status.to_string(),
            provider_subscription_id: provider_subscription_id.to_string(),
            amount,
            currency: currency.to_string(),
            current_period_start,
            current_period_end,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        subscriptions.push(subscription.clone());
        Ok(subscription)
    }
}

#[async_trait]
impl NotificationExt for MemoryStore {
    async fn queue_notification(
        &self,
        referrer_id: Uuid,
        notification_type: NotificationType,
        amount: f64,
        currency: &str,
        referred_user_name: &str,
        payout_method: &str,
    ) -> Result<PendingCommissionNotification, sqlx::Error> {
        let notification = PendingCommissionNotification {
            id: Uuid::new_v4(),
            referrer_id,
            notification_type,
            amount,
            currency: currency.to_string(),
            referred_user_name: referred_user_name.to_string(),
            payout_method: payout_method.to_string(),
            created_at: Some(Utc::now()),
            sent_at: None,
            batch_id: None,
        };
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn get_unsent_notifications(
        &self,
    ) -> Result<Vec<PendingCommissionNotification>, sqlx::Error> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.sent_at.is_none())
            .cloned()
            .collect())
    }

    async fn mark_notifications_sent(
        &self,
        notification_ids: &[Uuid],
        batch_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let mut notifications = self.notifications.lock().unwrap();
        let mut marked = 0;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.sent_at.is_none() && notification_ids.contains(&n.id))
        {
            notification.sent_at = Some(Utc::now());
            notification.batch_id = Some(batch_id);
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete_sent_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut notifications = self.notifications.lock().unwrap();
        let before = notifications.len();
        notifications.retain(|n| match n.sent_at {
            Some(sent_at) => sent_at >= cutoff,
            None => true,
        });
        Ok((before - notifications.len()) as u64)
    }
}

#[async_trait]
impl DigestRunExt for MemoryStore {
    async fn acquire_digest_lease(
        &self,
        _stale_cutoff: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        if *self.lease_busy.lock().unwrap() {
            return Ok(None);
        }
        Ok(Some(Uuid::new_v4()))
    }

    async fn finish_digest_lease(&self, _lease_id: Uuid) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

/// Scripted payment provider. Configure the responses up front, then inspect
/// the recorded transfers afterwards.
pub struct ScriptedProvider {
    pub customer_email: Option<String>,
    pub payouts_capable: bool,
    pub capability_check_fails: bool,
    pub transfer_id: Option<String>,
    pub transfers: Mutex<Vec<String>>,
    pub capability_checks: Mutex<u32>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            customer_email: None,
            payouts_capable: false,
            capability_check_fails: false,
            transfer_id: None,
            transfers: Mutex::new(Vec::new()),
            capability_checks: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PaymentProvider for ScriptedProvider {
    async fn get_customer(&self, customer_id: &str) -> Result<StripeCustomer, ServiceError> {
        Ok(StripeCustomer {
            id: customer_id.to_string(),
            email: self.customer_email.clone(),
            name: Some("Scripted Customer".to_string()),
        })
    }

    async fn account_can_receive_payouts(&self, _account_id: &str) -> Result<bool, ServiceError> {
        *self.capability_checks.lock().unwrap() += 1;
        if self.capability_check_fails {
            return Err(ServiceError::Provider("account lookup failed".to_string()));
        }
        Ok(self.payouts_capable)
    }

    async fn create_transfer(
        &self,
        _amount_minor: i64,
        _currency: &str,
        destination: &str,
        _commission_id: Uuid,
    ) -> Result<String, ServiceError> {
        let Some(transfer_id) = &self.transfer_id else {
            return Err(ServiceError::Provider("transfer declined".to_string()));
        };
        self.transfers.lock().unwrap().push(destination.to_string());
        Ok(transfer_id.clone())
    }
}

/// Records recipients instead of calling Resend. `fail_for` makes delivery to
/// one address fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<String>>,
    pub fail_for: Option<String>,
}

#[async_trait]
impl DigestMailer for RecordingMailer {
    async fn send_digest(
        &self,
        to_email: &str,
        _username: &str,
        _earned: &[PendingCommissionNotification],
        _paid: &[PendingCommissionNotification],
    ) -> Result<(), ServiceError> {
        if self.fail_for.as_deref() == Some(to_email) {
            return Err(ServiceError::Email(format!(
                "delivery to {} refused",
                to_email
            )));
        }
        self.sent.lock().unwrap().push(to_email.to_string());
        Ok(())
    }
}
