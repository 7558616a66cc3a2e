// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    // Stripe configuration
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    // Email service configuration
    pub resend_api_key: String,
    pub from_email: String,
    // Commission settings
    pub commission_fee: f64,
    pub commission_currency: String,
    // Digest scheduler
    pub digest_interval_secs: u64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let stripe_secret_key =
            std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
        let stripe_webhook_secret =
            std::env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set");
        let resend_api_key =
            std::env::var("RESEND_API_KEY").expect("RESEND_API_KEY must be set");

        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "Refledger <noreply@refledger.app>".to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        // Flat referral fee per confirmed payment, in major currency units
        let commission_fee = std::env::var("COMMISSION_FLAT_FEE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(5.0);
        let commission_currency = std::env::var("COMMISSION_CURRENCY")
            .unwrap_or_else(|_| "usd".to_string());

        let digest_interval_secs = std::env::var("DIGEST_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86400); // Daily

        Config {
            database_url,
            port,
            stripe_secret_key,
            stripe_webhook_secret,
            resend_api_key,
            from_email,
            commission_fee,
            commission_currency,
            digest_interval_secs,
        }
    }
}
