// handler/digest.rs
use std::sync::Arc;

use axum::{response::IntoResponse, Extension, Json};

use crate::{
    dtos::digestdtos::DigestRunResponse,
    error::HttpError,
    mail::mails::ResendMailer,
    service::{digest_service::DigestService, error::ServiceError},
    AppState,
};

/// Scheduler-invoked digest trigger.
pub async fn run_digest(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let mailer = Arc::new(ResendMailer::new(&app_state.env));
    let digest_service = DigestService::new(app_state.db_client.clone(), mailer);

    match digest_service.run().await {
        Ok(outcome) => Ok(Json(DigestRunResponse {
            success: true,
            message: format!("Digest batch {} complete", outcome.batch_id),
            emails_sent: outcome.emails_sent,
            notifications_processed: outcome.notifications_processed,
            batch_id: Some(outcome.batch_id),
            old_records_cleaned: outcome.old_records_cleaned,
        })),
        Err(ServiceError::DigestLocked) => Ok(Json(DigestRunResponse {
            success: false,
            message: "Another digest run is already in progress".to_string(),
            emails_sent: 0,
            notifications_processed: 0,
            batch_id: None,
            old_records_cleaned: 0,
        })),
        Err(e) => Err(e.into()),
    }
}
