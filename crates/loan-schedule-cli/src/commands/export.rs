use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use loan_schedule_core::batch::{self, LoanBatch, LoanFailure};
use loan_schedule_core::export::xlsx::WorkbookExporter;
use loan_schedule_core::schedule::LoanSpec;
use loan_schedule_core::types::with_metadata;

use crate::input;

/// Arguments for exporting many loans to one workbook
#[derive(Args)]
pub struct ExportArgs {
    /// Path to JSON/YAML file with the loans
    #[arg(long)]
    pub input: Option<String>,

    /// Workbook to write
    #[arg(long, default_value = "loan_schedules.xlsx")]
    pub out: String,
}

/// Loans file: either `{"loans": [...]}` or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoanFile {
    Batch(LoanBatch),
    List(Vec<LoanSpec>),
}

impl LoanFile {
    fn into_loans(self) -> Vec<LoanSpec> {
        match self {
            LoanFile::Batch(batch) => batch.loans,
            LoanFile::List(loans) => loans,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    output_file: String,
    sheets: Vec<String>,
    failures: Vec<LoanFailure>,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let loans = input::load::<LoanFile>(args.input.as_deref(), "workbook export")?.into_loans();
    if loans.is_empty() {
        return Err("no loans to export".into());
    }

    tracing::info!(loans = loans.len(), out = %args.out, "exporting loan schedules");
    let mut exporter = WorkbookExporter::new();
    let report = batch::export_loans(&loans, &mut exporter);

    if report.all_failed() {
        let reasons: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.loan_id, f.error))
            .collect();
        return Err(format!("every loan failed; nothing written ({})", reasons.join("; ")).into());
    }

    exporter.save(&args.out)?;

    let output = ExportOutput {
        output_file: args.out.clone(),
        sheets: report.written,
        failures: report.failures,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        "Batch amortization export, one sheet per loan",
        &loans,
        report.warnings,
        elapsed,
        output,
    ))?)
}
