//! Prepayment rules: additional principal paid on top of the scheduled payment.
//!
//! A rule is anything that maps a period index to an amount. Closures work
//! directly; [`PrepaymentPlan`] is the serialisable family used by file inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{round_money, Money};

/// Strategy yielding the prepayment due in a given period (1-based).
pub trait PrepaymentRule {
    fn amount_for(&self, period: u32) -> Money;
}

impl<F> PrepaymentRule for F
where
    F: Fn(u32) -> Money,
{
    fn amount_for(&self, period: u32) -> Money {
        self(period)
    }
}

/// The constant-zero rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPrepayment;

impl PrepaymentRule for NoPrepayment {
    fn amount_for(&self, _period: u32) -> Money {
        Decimal::ZERO
    }
}

/// Declarative prepayment rules that can be read from JSON or YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrepaymentPlan {
    #[default]
    None,
    /// Same amount every period.
    Constant { amount: Money },
    /// `round(base - step * period, 2)` up to and including `through_period`, zero after.
    Linear {
        base: Money,
        step: Money,
        through_period: u32,
    },
    /// One amount on even periods, another on odd periods.
    Alternating { even: Money, odd: Money },
    /// Explicit amounts for periods 1..=n, zero beyond.
    Explicit { amounts: Vec<Money> },
}

impl PrepaymentPlan {
    pub fn is_none(&self) -> bool {
        matches!(self, PrepaymentPlan::None)
    }
}

impl PrepaymentRule for PrepaymentPlan {
    fn amount_for(&self, period: u32) -> Money {
        match self {
            PrepaymentPlan::None => Decimal::ZERO,
            PrepaymentPlan::Constant { amount } => *amount,
            PrepaymentPlan::Linear {
                base,
                step,
                through_period,
            } => {
                if period <= *through_period {
                    round_money(base.saturating_sub(step.saturating_mul(Decimal::from(period))))
                } else {
                    Decimal::ZERO
                }
            }
            PrepaymentPlan::Alternating { even, odd } => {
                if period % 2 == 0 {
                    *even
                } else {
                    *odd
                }
            }
            PrepaymentPlan::Explicit { amounts } => period
                .checked_sub(1)
                .and_then(|idx| amounts.get(idx as usize))
                .copied()
                .unwrap_or(Decimal::ZERO),
        }
    }
}
