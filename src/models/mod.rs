pub mod commissionmodel;
pub mod notificationmodel;
pub mod subscriptionmodel;
pub mod usermodel;
