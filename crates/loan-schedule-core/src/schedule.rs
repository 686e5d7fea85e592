//! Fixed-payment amortization schedules.
//!
//! Balances roll forward one period at a time: interest accrues on the opening
//! balance, the scheduled payment plus any prepayment retires principal, and every
//! derived amount is rounded to cents before it feeds the next step. The last
//! period (or the first period that would overshoot) absorbs whatever remains so
//! the loan closes at exactly zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dates::{self, next_period};
use crate::error::ScheduleError;
use crate::prepayment::{PrepaymentPlan, PrepaymentRule};
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::ScheduleResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on records reserved up front (100 years of monthly periods).
const PREALLOCATED_PERIODS: u32 = 1200;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Terms of a single loan as supplied by a caller or an input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSpec {
    /// Identifier, used to name the loan's sheet.
    #[serde(alias = "loan_number")]
    pub loan_id: String,
    pub loan_amount: Money,
    /// Annual rate in percent (8 = 8%).
    pub annual_interest_rate: Percent,
    /// Fixed periodic payment. Defaults to the level payment for the term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    #[serde(default, skip_serializing_if = "PrepaymentPlan::is_none")]
    pub prepayment: PrepaymentPlan,
    #[serde(alias = "months")]
    pub periods: u32,
    /// Start date, `MM/DD/YYYY`.
    pub start_date: String,
}

/// One row of a schedule.
///
/// Period 0 is the synthetic opening row: payment, prepayment and interest do
/// not apply to it and are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub period: u32,
    #[serde(with = "crate::dates::mdy")]
    pub date: NaiveDate,
    pub opening_balance: Money,
    pub payment: Option<Money>,
    pub prepayment: Option<Money>,
    pub interest: Option<Money>,
    pub principal: Money,
    pub closing_balance: Money,
}

impl PeriodRecord {
    fn initial(date: NaiveDate, loan_amount: Money) -> Self {
        PeriodRecord {
            period: 0,
            date,
            opening_balance: Decimal::ZERO,
            payment: None,
            prepayment: None,
            interest: None,
            principal: Decimal::ZERO,
            closing_balance: loan_amount,
        }
    }
}

/// An ordered, immutable sequence of period records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    records: Vec<PeriodRecord>,
}

impl Schedule {
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodRecord> {
        self.records.iter()
    }

    /// Number of records, including period 0.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Closing balance of the last record.
    pub fn final_balance(&self) -> Money {
        self.last()
            .map(|r| r.closing_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Payment periods actually run (period 0 excluded).
    pub fn periods_run(&self) -> u32 {
        self.last().map(|r| r.period).unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a PeriodRecord;
    type IntoIter = std::slice::Iter<'a, PeriodRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Totals over a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods_run: u32,
    pub nominal_periods: u32,
    pub total_scheduled_payments: Money,
    pub total_prepayments: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    #[serde(with = "crate::dates::mdy")]
    pub payoff_date: NaiveDate,
    pub closed_early: bool,
}

/// Result of [`build_schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub loan_id: String,
    pub sheet_name: String,
    pub monthly_rate: Rate,
    pub payment: Money,
    pub summary: ScheduleSummary,
    pub periods: Schedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the amortization schedule for one loan.
///
/// Without a prepayment rule every period's prepayment is zero. The result
/// holds period 0 followed by one record per payment period, stopping early
/// once the closing balance reaches zero.
pub fn generate(
    loan_amount: Money,
    annual_rate_percent: Percent,
    payment: Money,
    prepayment: Option<&dyn PrepaymentRule>,
    periods: u32,
    start_date: NaiveDate,
) -> ScheduleResult<Schedule> {
    validate_terms(loan_amount, annual_rate_percent, payment, periods)?;

    let rate = monthly_rate(annual_rate_percent);
    // Loans often close well before the nominal term; don't reserve for it.
    let mut records: Vec<PeriodRecord> =
        Vec::with_capacity(periods.min(PREALLOCATED_PERIODS) as usize + 1);
    let mut date = start_date;

    records.push(PeriodRecord::initial(date, loan_amount));
    date = next_period(date)?;

    let mut opening_balance = loan_amount;

    for period in 1..=periods {
        let extra = match prepayment {
            Some(rule) => rule.amount_for(period),
            None => Decimal::ZERO,
        };
        if extra < Decimal::ZERO {
            return Err(ScheduleError::InvalidInput {
                field: "prepayment".into(),
                reason: format!("Prepayment for period {period} is negative ({extra})"),
            });
        }

        let interest = opening_balance
            .checked_mul(rate)
            .map(round_money)
            .ok_or_else(|| balance_overflow(period))?;
        let funds = payment
            .checked_add(extra)
            .ok_or_else(|| ScheduleError::InvalidInput {
                field: "prepayment".into(),
                reason: format!("Payment plus prepayment overflows at period {period}"),
            })?;
        let mut principal = funds
            .checked_sub(interest)
            .map(round_money)
            .ok_or_else(|| balance_overflow(period))?;
        let mut closing_balance = opening_balance
            .checked_sub(principal)
            .map(round_money)
            .ok_or_else(|| balance_overflow(period))?;

        // Closure: the last period, or an overshoot, takes the remainder.
        if period == periods || closing_balance < Decimal::ZERO {
            principal += closing_balance;
            closing_balance = Decimal::ZERO;
        }

        records.push(PeriodRecord {
            period,
            date,
            opening_balance,
            payment: Some(payment),
            prepayment: Some(extra),
            interest: Some(interest),
            principal,
            closing_balance,
        });

        opening_balance = closing_balance;
        date = next_period(date)?;

        if closing_balance.is_zero() {
            break;
        }
    }

    tracing::debug!(
        records = records.len(),
        nominal_periods = periods,
        "generated amortization schedule"
    );

    Ok(Schedule { records })
}

/// Validate a loan, generate its schedule and wrap it with totals and warnings.
pub fn build_schedule(spec: &LoanSpec) -> ScheduleResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if spec.loan_id.trim().is_empty() {
        return Err(ScheduleError::InvalidInput {
            field: "loan_id".into(),
            reason: "Loan identifier cannot be empty".into(),
        });
    }

    let start_date = dates::parse_date(&spec.start_date)?;

    let payment = match spec.payment {
        Some(p) => p,
        None => {
            let level = level_payment(spec.loan_amount, spec.annual_interest_rate, spec.periods)?;
            warnings.push(format!(
                "No payment supplied; using level payment {level} over {} periods",
                spec.periods
            ));
            level
        }
    };

    let rule: Option<&dyn PrepaymentRule> = if spec.prepayment.is_none() {
        None
    } else {
        Some(&spec.prepayment)
    };

    let schedule = generate(
        spec.loan_amount,
        spec.annual_interest_rate,
        payment,
        rule,
        spec.periods,
        start_date,
    )?;

    let rate = monthly_rate(spec.annual_interest_rate);
    let first_interest = round_money(spec.loan_amount * rate);
    if payment <= first_interest {
        warnings.push(format!(
            "Payment {payment} does not cover first-period interest {first_interest}; \
             the balance is retired in the final period"
        ));
    }

    let summary = summarize(&schedule, spec.periods);
    if summary.closed_early {
        warnings.push(format!(
            "Loan paid off at period {} of {}",
            summary.periods_run, spec.periods
        ));
    } else if let Some(residual) = final_residual(&schedule) {
        if residual > payment {
            warnings.push(format!(
                "Final period absorbs a residual balance of {residual}"
            ));
        }
    }

    tracing::debug!(
        loan_id = %spec.loan_id,
        periods_run = summary.periods_run,
        warnings = warnings.len(),
        "built loan schedule"
    );

    let output = ScheduleOutput {
        loan_id: spec.loan_id.clone(),
        sheet_name: crate::export::sheet_name(&spec.loan_id),
        monthly_rate: rate,
        payment,
        summary,
        periods: schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment amortization: 30-day periods, interest on opening balance, \
         cent rounding at each step, final-period closure",
        spec,
        warnings,
        elapsed,
        output,
    ))
}

/// Totals over a schedule generated for `nominal_periods` periods.
pub fn summarize(schedule: &Schedule, nominal_periods: u32) -> ScheduleSummary {
    let mut total_scheduled_payments = Decimal::ZERO;
    let mut total_prepayments = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for record in schedule.iter().skip(1) {
        total_scheduled_payments = total_scheduled_payments
            .saturating_add(record.payment.unwrap_or(Decimal::ZERO));
        total_prepayments =
            total_prepayments.saturating_add(record.prepayment.unwrap_or(Decimal::ZERO));
        total_interest = total_interest.saturating_add(record.interest.unwrap_or(Decimal::ZERO));
        total_principal = total_principal.saturating_add(record.principal);
    }

    let periods_run = schedule.periods_run();
    let payoff_date = schedule
        .last()
        .map(|r| r.date)
        .unwrap_or(NaiveDate::MIN);

    ScheduleSummary {
        periods_run,
        nominal_periods,
        total_scheduled_payments,
        total_prepayments,
        total_interest,
        total_principal,
        payoff_date,
        closed_early: periods_run < nominal_periods,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(
    loan_amount: Money,
    annual_rate_percent: Percent,
    payment: Money,
    periods: u32,
) -> ScheduleResult<()> {
    if loan_amount <= Decimal::ZERO {
        return Err(ScheduleError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(ScheduleError::InvalidInput {
            field: "annual_interest_rate".into(),
            reason: "Annual interest rate cannot be negative".into(),
        });
    }
    if payment < Decimal::ZERO {
        return Err(ScheduleError::InvalidInput {
            field: "payment".into(),
            reason: "Payment cannot be negative".into(),
        });
    }
    if periods == 0 {
        return Err(ScheduleError::InvalidInput {
            field: "periods".into(),
            reason: "Period count must be at least 1".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Interest outgrowing the payment until the balance leaves the decimal range.
fn balance_overflow(period: u32) -> ScheduleError {
    ScheduleError::InvalidInput {
        field: "annual_interest_rate".into(),
        reason: format!(
            "Balance overflows at period {period}; the payment does not keep pace with interest"
        ),
    }
}

/// Principal the last period took beyond what its payment covered.
fn final_residual(schedule: &Schedule) -> Option<Money> {
    let last = schedule.last()?;
    let covered = last
        .payment?
        .checked_add(last.prepayment.unwrap_or(Decimal::ZERO))?
        .checked_sub(last.interest?)
        .map(round_money)?;
    last.principal.checked_sub(covered)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
