use async_trait::async_trait;

use super::sendmail::send_email;
use crate::{
    config::Config, models::notificationmodel::PendingCommissionNotification,
    service::error::ServiceError, utils::currency::format_amount,
};

/// Delivery seam for the digest batcher. ResendMailer is the live
/// implementation; tests record instead of sending.
#[async_trait]
pub trait DigestMailer: Send + Sync {
    async fn send_digest(
        &self,
        to_email: &str,
        username: &str,
        earned: &[PendingCommissionNotification],
        paid: &[PendingCommissionNotification],
    ) -> Result<(), ServiceError>;
}

pub struct ResendMailer {
    api_key: String,
    from_email: String,
}

impl ResendMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.resend_api_key.clone(),
            from_email: config.from_email.clone(),
        }
    }
}

#[async_trait]
impl DigestMailer for ResendMailer {
    async fn send_digest(
        &self,
        to_email: &str,
        username: &str,
        earned: &[PendingCommissionNotification],
        paid: &[PendingCommissionNotification],
    ) -> Result<(), ServiceError> {
        send_commission_digest_email(&self.api_key, &self.from_email, to_email, username, earned, paid)
            .await
    }
}

/// One consolidated email per referrer per batch. The subject depends on
/// which categories the batch contains.
pub async fn send_commission_digest_email(
    api_key: &str,
    from_email: &str,
    to_email: &str,
    username: &str,
    earned: &[PendingCommissionNotification],
    paid: &[PendingCommissionNotification],
) -> Result<(), ServiceError> {
    let subject = digest_subject(earned.len(), paid.len());
    let template_path = "src/mail/templates/Commission-Digest.html";

    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{earned_section}}".to_string(), earned_section(earned)),
        ("{{paid_section}}".to_string(), paid_section(paid)),
    ];

    send_email(api_key, from_email, to_email, &subject, template_path, &placeholders).await
}

pub fn digest_subject(earned_count: usize, paid_count: usize) -> String {
    match (earned_count > 0, paid_count > 0) {
        (true, true) => "Referral update: new commissions and completed payouts".to_string(),
        (true, false) => "You earned new referral commissions".to_string(),
        (false, true) => "Your referral payouts are on the way".to_string(),
        (false, false) => "Referral activity update".to_string(),
    }
}

fn earned_section(earned: &[PendingCommissionNotification]) -> String {
    if earned.is_empty() {
        return String::new();
    }
    let total: f64 = earned.iter().map(|n| n.amount).sum();
    let currency = &earned[0].currency;
    format!(
        "<h3>Commissions earned ({} total)</h3><table>{}</table>",
        format_amount(total, currency),
        rows_html(earned)
    )
}

fn paid_section(paid: &[PendingCommissionNotification]) -> String {
    if paid.is_empty() {
        return String::new();
    }
    let total: f64 = paid.iter().map(|n| n.amount).sum();
    let currency = &paid[0].currency;
    format!(
        "<h3>Payouts completed ({} total)</h3><table>{}</table>",
        format_amount(total, currency),
        rows_html(paid)
    )
}

fn rows_html(rows: &[PendingCommissionNotification]) -> String {
    rows.iter()
        .map(|n| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                n.referred_user_name,
                format_amount(n.amount, &n.currency)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notificationmodel::NotificationType;
    use uuid::Uuid;

    fn notification(name: &str, amount: f64) -> PendingCommissionNotification {
        PendingCommissionNotification {
            id: Uuid::new_v4(),
            referrer_id: Uuid::new_v4(),
            notification_type: NotificationType::CommissionEarned,
            amount,
            currency: "usd".to_string(),
            referred_user_name: name.to_string(),
            payout_method: "none".to_string(),
            created_at: None,
            sent_at: None,
            batch_id: None,
        }
    }

    #[test]
    fn subject_varies_by_category_mix() {
        assert_eq!(
            digest_subject(2, 1),
            "Referral update: new commissions and completed payouts"
        );
        assert_eq!(digest_subject(3, 0), "You earned new referral commissions");
        assert_eq!(digest_subject(0, 2), "Your referral payouts are on the way");
    }

    #[test]
    fn earned_section_sums_amounts() {
        let rows = vec![notification("Alice", 5.0), notification("Bob", 5.0)];
        let html = earned_section(&rows);
        assert!(html.contains("$10.00 total"));
        assert!(html.contains("Alice"));
        assert!(html.contains("Bob"));
        assert!(html.contains("$5.00"));
    }

    #[test]
    fn empty_categories_render_nothing() {
        assert_eq!(earned_section(&[]), "");
        assert_eq!(paid_section(&[]), "");
    }
}
