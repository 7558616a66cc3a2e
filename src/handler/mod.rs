pub mod digest;
pub mod webhook;
