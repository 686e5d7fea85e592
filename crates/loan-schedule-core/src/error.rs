use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Sheet name collision: '{0}' already exists in the workbook")]
    SheetNameCollision(String),

    #[error("Export failure: {0}")]
    ExportFailure(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "xlsx")]
impl From<rust_xlsxwriter::XlsxError> for ScheduleError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ScheduleError::ExportFailure(e.to_string())
    }
}
