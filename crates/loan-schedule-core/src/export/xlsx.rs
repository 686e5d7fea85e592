//! `.xlsx` workbook sink built on `rust_xlsxwriter`.
//!
//! Each schedule is laid out on a detached worksheet and only attached to the
//! workbook once every cell has been written. Nothing reaches disk until
//! [`WorkbookExporter::save`].

use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use super::{record_cells, validate_sheet_name, Cell, ScheduleSink, SHEET_HEADERS};
use crate::error::ScheduleError;
use crate::schedule::Schedule;
use crate::types::Money;
use crate::ScheduleResult;

/// Rows available on one `.xlsx` worksheet, header included.
const MAX_SHEET_ROWS: usize = 1_048_576;

struct SheetFormats {
    header: Format,
    money: Format,
    text: Format,
}

impl SheetFormats {
    fn new() -> Self {
        SheetFormats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            money: Format::new().set_num_format("#,##0.00"),
            text: Format::new().set_align(FormatAlign::Right),
        }
    }
}

/// Workbook holding one sheet per loan, in the order they were written.
pub struct WorkbookExporter {
    workbook: Workbook,
    sheet_names: Vec<String>,
    formats: SheetFormats,
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookExporter {
    pub fn new() -> Self {
        WorkbookExporter {
            workbook: Workbook::new(),
            sheet_names: Vec::new(),
            formats: SheetFormats::new(),
        }
    }

    /// Names of the sheets written so far, in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Persist the workbook. Fails without touching disk when no sheet was written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> ScheduleResult<()> {
        self.ensure_not_empty()?;
        let path = path.as_ref();
        self.workbook.save(path).map_err(|e| {
            ScheduleError::ExportFailure(format!("failed to save '{}': {e}", path.display()))
        })?;
        tracing::info!(
            path = %path.display(),
            sheets = self.sheet_names.len(),
            "saved workbook"
        );
        Ok(())
    }

    /// Serialize the workbook to memory instead of a file.
    pub fn save_to_buffer(&mut self) -> ScheduleResult<Vec<u8>> {
        self.ensure_not_empty()?;
        Ok(self.workbook.save_to_buffer()?)
    }

    fn ensure_not_empty(&self) -> ScheduleResult<()> {
        if self.sheet_names.is_empty() {
            return Err(ScheduleError::ExportFailure(
                "workbook has no sheets to save".into(),
            ));
        }
        Ok(())
    }

    fn lay_out(&self, sheet_name: &str, schedule: &Schedule) -> ScheduleResult<Worksheet> {
        check_row_limit(schedule.len() + 1)?;
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet_name)?;

        for (col, header) in SHEET_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &self.formats.header)?;
        }

        for (idx, record) in schedule.iter().enumerate() {
            // Bounded by the row check above.
            let row = (idx + 1) as u32;
            for (col, cell) in record_cells(record).iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Period(n) => {
                        worksheet.write_number(row, col, f64::from(*n))?;
                    }
                    Cell::Date(d) => {
                        worksheet.write_string(row, col, d.as_str())?;
                    }
                    Cell::Amount(m) => {
                        worksheet.write_number_with_format(
                            row,
                            col,
                            amount_to_f64(*m)?,
                            &self.formats.money,
                        )?;
                    }
                    Cell::NotApplicable => {
                        worksheet.write_string_with_format(
                            row,
                            col,
                            cell.to_string(),
                            &self.formats.text,
                        )?;
                    }
                }
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofit();
        Ok(worksheet)
    }
}

impl ScheduleSink for WorkbookExporter {
    fn write_schedule(&mut self, sheet_name: &str, schedule: &Schedule) -> ScheduleResult<()> {
        validate_sheet_name(sheet_name)?;
        // Spreadsheet applications compare sheet names case-insensitively.
        if self
            .sheet_names
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(sheet_name))
        {
            return Err(ScheduleError::SheetNameCollision(sheet_name.to_string()));
        }

        let worksheet = self.lay_out(sheet_name, schedule)?;
        self.workbook.push_worksheet(worksheet);
        self.sheet_names.push(sheet_name.to_string());

        tracing::info!(sheet = sheet_name, rows = schedule.len(), "wrote schedule sheet");
        Ok(())
    }
}

fn check_row_limit(rows: usize) -> ScheduleResult<()> {
    if rows > MAX_SHEET_ROWS {
        return Err(ScheduleError::ExportFailure(format!(
            "schedule needs {rows} rows, exceeding the {MAX_SHEET_ROWS}-row sheet limit"
        )));
    }
    Ok(())
}

fn amount_to_f64(value: Money) -> ScheduleResult<f64> {
    value.to_f64().ok_or_else(|| {
        ScheduleError::ExportFailure(format!("amount {value} cannot be represented as a number"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use crate::schedule::generate;
    use rust_decimal_macros::dec;

    fn schedule() -> Schedule {
        generate(
            dec!(45000),
            dec!(10),
            dec!(1400.50),
            None,
            24,
            parse_date("10/01/2023").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_sheets_keep_write_order() {
        let mut exporter = WorkbookExporter::new();
        exporter.write_schedule("Loan_002", &schedule()).unwrap();
        exporter.write_schedule("Loan_001", &schedule()).unwrap();
        assert_eq!(exporter.sheet_names(), ["Loan_002", "Loan_001"]);
    }

    #[test]
    fn test_duplicate_sheet_rejected() {
        let mut exporter = WorkbookExporter::new();
        exporter.write_schedule("Loan_001", &schedule()).unwrap();
        let err = exporter.write_schedule("loan_001", &schedule()).unwrap_err();
        assert!(matches!(err, ScheduleError::SheetNameCollision(_)));
        assert_eq!(exporter.sheet_names().len(), 1);
    }

    #[test]
    fn test_invalid_sheet_name_creates_nothing() {
        let mut exporter = WorkbookExporter::new();
        let err = exporter.write_schedule("Loan_a:b", &schedule()).unwrap_err();
        assert!(matches!(err, ScheduleError::ExportFailure(_)));
        assert!(exporter.sheet_names().is_empty());
    }

    #[test]
    fn test_empty_workbook_not_saved() {
        let mut exporter = WorkbookExporter::new();
        assert!(matches!(
            exporter.save_to_buffer(),
            Err(ScheduleError::ExportFailure(_))
        ));
    }

    #[test]
    fn test_row_limit() {
        assert!(check_row_limit(MAX_SHEET_ROWS).is_ok());
        match check_row_limit(MAX_SHEET_ROWS + 1) {
            Err(ScheduleError::ExportFailure(msg)) => assert!(msg.contains("1048576-row")),
            other => panic!("expected ExportFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_save_to_buffer_is_zip() {
        let mut exporter = WorkbookExporter::new();
        exporter.write_schedule("Loan_001", &schedule()).unwrap();
        let bytes = exporter.save_to_buffer().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
