pub mod digestdtos;
pub mod webhookdtos;
