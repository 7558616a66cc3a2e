pub mod background_jobs;
pub mod commission_service;
pub mod digest_service;
pub mod error;
pub mod payout_service;
pub mod stripe;

#[cfg(test)]
pub mod test_support;
