pub mod commissiondb;
pub mod db;
pub mod digestdb;
pub mod notificationdb;
pub mod settingsdb;
pub mod subscriptiondb;
pub mod userdb;

use commissiondb::CommissionExt;
use digestdb::DigestRunExt;
use notificationdb::NotificationExt;
use subscriptiondb::SubscriptionExt;
use userdb::UserExt;

/// Everything the webhook ledger flow needs from storage.
pub trait CommissionStore:
    UserExt + CommissionExt + SubscriptionExt + NotificationExt + Send + Sync
{
}

impl<T> CommissionStore for T where
    T: UserExt + CommissionExt + SubscriptionExt + NotificationExt + Send + Sync
{
}

/// Everything the digest batcher needs from storage.
pub trait DigestStore: UserExt + NotificationExt + DigestRunExt + Send + Sync {}

impl<T> DigestStore for T where T: UserExt + NotificationExt + DigestRunExt + Send + Sync {}
