use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_schedule_core::schedule::{self, LoanSpec};
use loan_schedule_core::PrepaymentPlan;

use crate::input;

/// Arguments for a single loan schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML file describing one loan
    #[arg(long)]
    pub input: Option<String>,

    /// Loan identifier (names the sheet)
    #[arg(long, default_value = "1")]
    pub loan_id: String,

    /// Principal amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8 for 8%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Fixed periodic payment (defaults to the level payment)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Number of payment periods
    #[arg(long)]
    pub periods: Option<u32>,

    /// Start date, MM/DD/YYYY
    #[arg(long)]
    pub start_date: Option<String>,

    /// Constant prepayment added every period
    #[arg(long)]
    pub prepayment: Option<Decimal>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = match inline_spec(&args)? {
        Some(spec) => spec,
        None => input::load(args.input.as_deref(), "a loan schedule")?,
    };
    let result = schedule::build_schedule(&spec)?;
    Ok(serde_json::to_value(result)?)
}

/// Build a loan from flags when `--loan-amount` is given.
fn inline_spec(args: &ScheduleArgs) -> Result<Option<LoanSpec>, Box<dyn std::error::Error>> {
    let Some(loan_amount) = args.loan_amount else {
        return Ok(None);
    };
    let annual_interest_rate = args.rate.ok_or("--rate is required with --loan-amount")?;
    let periods = args.periods.ok_or("--periods is required with --loan-amount")?;
    let start_date = args
        .start_date
        .clone()
        .ok_or("--start-date is required with --loan-amount")?;

    let prepayment = match args.prepayment {
        Some(amount) => PrepaymentPlan::Constant { amount },
        None => PrepaymentPlan::None,
    };

    Ok(Some(LoanSpec {
        loan_id: args.loan_id.clone(),
        loan_amount,
        annual_interest_rate,
        payment: args.payment,
        prepayment,
        periods,
        start_date,
    }))
}
