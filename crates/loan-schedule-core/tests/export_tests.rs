#![cfg(feature = "xlsx")]

use loan_schedule_core::batch::{export_loans, FailureStage};
use loan_schedule_core::export::xlsx::WorkbookExporter;
use loan_schedule_core::schedule::LoanSpec;
use loan_schedule_core::{PrepaymentPlan, ScheduleError};
use rust_decimal_macros::dec;

fn loan(id: &str, rate: rust_decimal::Decimal) -> LoanSpec {
    LoanSpec {
        loan_id: id.into(),
        loan_amount: dec!(35000),
        annual_interest_rate: rate,
        payment: Some(dec!(1096.77)),
        prepayment: PrepaymentPlan::None,
        periods: 36,
        start_date: "09/01/2023".into(),
    }
}

#[test]
fn test_batch_to_workbook_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loan_schedules.xlsx");

    let loans = vec![loan("001", dec!(8)), loan("002", dec!(-1)), loan("003", dec!(6))];
    let mut exporter = WorkbookExporter::new();
    let report = export_loans(&loans, &mut exporter);

    assert_eq!(report.written, vec!["Loan_001", "Loan_003"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, FailureStage::Input);
    assert_eq!(exporter.sheet_names(), ["Loan_001", "Loan_003"]);

    exporter.save(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_nothing_saved_when_every_loan_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");

    let mut exporter = WorkbookExporter::new();
    let report = export_loans(&[loan("001", dec!(-5))], &mut exporter);
    assert!(report.all_failed());

    let err = exporter.save(&path).unwrap_err();
    assert!(matches!(err, ScheduleError::ExportFailure(_)));
    assert!(!path.exists());
}

#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("out.xlsx");

    let mut exporter = WorkbookExporter::new();
    export_loans(&[loan("001", dec!(8))], &mut exporter);
    assert!(matches!(
        exporter.save(&path),
        Err(ScheduleError::ExportFailure(_))
    ));
    // Sheets survive a failed save so the caller can retry elsewhere.
    assert_eq!(exporter.sheet_names(), ["Loan_001"]);
    exporter.save(dir.path().join("retry.xlsx")).unwrap();
}
