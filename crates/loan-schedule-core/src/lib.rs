pub mod batch;
pub mod dates;
pub mod error;
pub mod export;
pub mod prepayment;
pub mod schedule;
pub mod time_value;
pub mod types;

pub use error::ScheduleError;
pub use prepayment::{NoPrepayment, PrepaymentPlan, PrepaymentRule};
pub use schedule::{generate, LoanSpec, PeriodRecord, Schedule};
pub use types::*;

/// Standard result type for all loan-schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;
