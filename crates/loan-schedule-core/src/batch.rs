//! Multi-loan runs: one sheet per loan, in input order.

use serde::{Deserialize, Serialize};

use crate::export::{sheet_name, ScheduleSink};
use crate::schedule::{build_schedule, LoanSpec};

/// Loans read from an input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanBatch {
    pub loans: Vec<LoanSpec>,
}

/// Where a loan dropped out of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Input,
    Export,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanFailure {
    pub loan_id: String,
    pub stage: FailureStage,
    pub error: String,
}

/// Outcome of [`export_loans`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Sheets written, in workbook order.
    pub written: Vec<String>,
    pub failures: Vec<LoanFailure>,
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn all_failed(&self) -> bool {
        self.written.is_empty() && !self.failures.is_empty()
    }
}

/// Build every loan's schedule and hand it to `sink`, keeping input order.
///
/// A loan that fails validation or export is recorded and skipped; the rest of
/// the batch still runs.
pub fn export_loans<S>(loans: &[LoanSpec], sink: &mut S) -> BatchReport
where
    S: ScheduleSink + ?Sized,
{
    let mut report = BatchReport::default();

    for spec in loans {
        let output = match build_schedule(spec) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(loan_id = %spec.loan_id, error = %e, "skipping loan");
                report.failures.push(LoanFailure {
                    loan_id: spec.loan_id.clone(),
                    stage: FailureStage::Input,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let name = sheet_name(&spec.loan_id);
        match sink.write_schedule(&name, &output.result.periods) {
            Ok(()) => {
                report
                    .warnings
                    .extend(output.warnings.into_iter().map(|w| format!("{name}: {w}")));
                report.written.push(name);
            }
            Err(e) => {
                tracing::warn!(loan_id = %spec.loan_id, error = %e, "sheet not written");
                report.failures.push(LoanFailure {
                    loan_id: spec.loan_id.clone(),
                    stage: FailureStage::Export,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScheduleError;
    use crate::prepayment::PrepaymentPlan;
    use crate::schedule::Schedule;
    use crate::ScheduleResult;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingSink {
        sheets: Vec<(String, usize)>,
    }

    impl ScheduleSink for RecordingSink {
        fn write_schedule(&mut self, sheet_name: &str, schedule: &Schedule) -> ScheduleResult<()> {
            if self.sheets.iter().any(|(n, _)| n == sheet_name) {
                return Err(ScheduleError::SheetNameCollision(sheet_name.into()));
            }
            self.sheets.push((sheet_name.into(), schedule.len()));
            Ok(())
        }
    }

    fn loan(id: &str, start: &str) -> LoanSpec {
        LoanSpec {
            loan_id: id.into(),
            loan_amount: dec!(45000),
            annual_interest_rate: dec!(10),
            payment: Some(dec!(1400.50)),
            prepayment: PrepaymentPlan::Alternating {
                even: dec!(100),
                odd: dec!(50),
            },
            periods: 24,
            start_date: start.into(),
        }
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let loans = vec![loan("B", "10/01/2023"), loan("A", "10/01/2023")];
        let mut sink = RecordingSink::default();
        let report = export_loans(&loans, &mut sink);
        assert_eq!(report.written, vec!["Loan_B", "Loan_A"]);
        assert_eq!(sink.sheets, vec![("Loan_B".to_string(), 25), ("Loan_A".to_string(), 25)]);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_bad_loan_does_not_stop_batch() {
        let loans = vec![
            loan("001", "10/01/2023"),
            loan("002", "31/12/2023"),
            loan("003", "10/01/2023"),
        ];
        let mut sink = RecordingSink::default();
        let report = export_loans(&loans, &mut sink);
        assert_eq!(report.written, vec!["Loan_001", "Loan_003"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].loan_id, "002");
        assert_eq!(report.failures[0].stage, FailureStage::Input);
        assert!(!report.all_failed());
    }

    #[test]
    fn test_duplicate_id_is_export_failure() {
        let loans = vec![loan("001", "10/01/2023"), loan("001", "11/01/2023")];
        let mut sink = RecordingSink::default();
        let report = export_loans(&loans, &mut sink);
        assert_eq!(report.written, vec!["Loan_001"]);
        assert_eq!(report.failures[0].stage, FailureStage::Export);
        assert_eq!(sink.sheets.len(), 1);
    }

    #[test]
    fn test_warnings_are_prefixed_by_sheet() {
        let mut sink = RecordingSink::default();
        let report = export_loans(&[loan("002", "10/01/2023")], &mut sink);
        assert!(report
            .warnings
            .iter()
            .all(|w| w.starts_with("Loan_002: ")));
        assert!(!report.warnings.is_empty());
    }
}
