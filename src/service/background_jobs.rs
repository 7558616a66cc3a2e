// service/background_jobs.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::{
    mail::mails::ResendMailer,
    service::{digest_service::DigestService, error::ServiceError},
    AppState,
};

/// In-process digest scheduler. The HTTP trigger at /api/digest/run covers
/// external schedulers; this loop covers deployments without one.
pub async fn start_digest_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(app_state.env.digest_interval_secs));
    // The first tick fires immediately; skip it so startup does not race a
    // deploy-time manual run.
    interval.tick().await;

    loop {
        interval.tick().await;

        tracing::info!("Running notification digest job at {}", Utc::now());

        let mailer = Arc::new(ResendMailer::new(&app_state.env));
        let digest_service = DigestService::new(app_state.db_client.clone(), mailer);
        match digest_service.run().await {
            Ok(outcome) => tracing::info!(
                "Digest job completed: batch {}, {} emails sent",
                outcome.batch_id,
                outcome.emails_sent
            ),
            Err(ServiceError::DigestLocked) => {
                tracing::info!("Digest job skipped, another run holds the lease")
            }
            Err(e) => tracing::error!("Digest job failed: {}", e),
        }
    }
}
