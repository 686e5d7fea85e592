pub mod export;
pub mod payment;
pub mod schedule;
