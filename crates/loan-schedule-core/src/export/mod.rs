//! Export of schedules as sheet rows.
//!
//! A schedule becomes a header row followed by one row per period, written to
//! a sheet named after the loan. Sinks receive a finished schedule and either
//! create the whole sheet or nothing.

#[cfg(feature = "xlsx")]
pub mod xlsx;

use std::fmt;

use crate::dates::format_date;
use crate::error::ScheduleError;
use crate::schedule::{PeriodRecord, Schedule};
use crate::types::Money;
use crate::ScheduleResult;

/// Column headers, in sheet order.
pub const SHEET_HEADERS: [&str; 8] = [
    "Period",
    "Date",
    "Opening Balance",
    "Payment",
    "Prepayment",
    "Interest",
    "Principal",
    "Closing Balance",
];

/// Serialized field name for each column of [`SHEET_HEADERS`].
pub const RECORD_FIELDS: [&str; 8] = [
    "period",
    "date",
    "opening_balance",
    "payment",
    "prepayment",
    "interest",
    "principal",
    "closing_balance",
];

/// Cell text for amounts that do not apply to a period.
pub const NOT_APPLICABLE: &str = "-";

const SHEET_PREFIX: &str = "Loan_";
const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Destination for finished schedules, one named sheet per call.
pub trait ScheduleSink {
    fn write_schedule(&mut self, sheet_name: &str, schedule: &Schedule) -> ScheduleResult<()>;
}

/// A single cell of an exported row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Period(u32),
    Date(String),
    Amount(Money),
    NotApplicable,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Period(n) => write!(f, "{n}"),
            Cell::Date(d) => f.write_str(d),
            Cell::Amount(m) => write!(f, "{m:.2}"),
            Cell::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Sheet name for a loan identifier.
pub fn sheet_name(loan_id: &str) -> String {
    format!("{SHEET_PREFIX}{}", loan_id.trim())
}

/// Cells of one record, in [`SHEET_HEADERS`] order.
pub fn record_cells(record: &PeriodRecord) -> [Cell; 8] {
    let amount = |value: Option<Money>| value.map(Cell::Amount).unwrap_or(Cell::NotApplicable);
    [
        Cell::Period(record.period),
        Cell::Date(format_date(record.date)),
        Cell::Amount(record.opening_balance),
        amount(record.payment),
        amount(record.prepayment),
        amount(record.interest),
        Cell::Amount(record.principal),
        Cell::Amount(record.closing_balance),
    ]
}

/// Rows of a schedule as text, header first.
pub fn text_rows(schedule: &Schedule) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(schedule.len() + 1);
    rows.push(SHEET_HEADERS.iter().map(|h| h.to_string()).collect());
    for record in schedule {
        rows.push(record_cells(record).iter().map(|c| c.to_string()).collect());
    }
    rows
}

/// Reject names a spreadsheet application would refuse.
pub fn validate_sheet_name(name: &str) -> ScheduleResult<()> {
    if name.trim().is_empty() {
        return Err(ScheduleError::ExportFailure("sheet name is empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(ScheduleError::ExportFailure(format!(
            "sheet name '{name}' exceeds {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return Err(ScheduleError::ExportFailure(format!(
            "sheet name '{name}' contains forbidden character '{c}'"
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(ScheduleError::ExportFailure(format!(
            "sheet name '{name}' cannot start or end with an apostrophe"
        )));
    }
    Ok(())
}
