use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use loan_schedule_core::time_value;

/// Arguments for level payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Principal amount
    #[arg(long)]
    pub loan_amount: Decimal,

    /// Annual interest rate in percent (e.g. 8 for 8%)
    #[arg(long)]
    pub rate: Decimal,

    /// Number of payment periods
    #[arg(long)]
    pub periods: u32,
}

#[derive(Debug, Serialize)]
struct PaymentOutput {
    payment: Decimal,
    monthly_rate: Decimal,
    periods: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = time_value::level_payment(args.loan_amount, args.rate, args.periods)?;
    let output = PaymentOutput {
        payment,
        monthly_rate: time_value::monthly_rate(args.rate),
        periods: args.periods,
    };
    Ok(serde_json::json!({ "result": serde_json::to_value(output)? }))
}
