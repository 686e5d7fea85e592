use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ScheduleError;
use crate::types::{round_money, Money, Percent, Rate};
use crate::ScheduleResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Periodic rate for an annual percentage quoted on a 12-period year.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// Level payment that retires `principal` over `periods` at `annual_rate_percent`, in cents.
pub fn level_payment(
    principal: Money,
    annual_rate_percent: Percent,
    periods: u32,
) -> ScheduleResult<Money> {
    if principal <= Decimal::ZERO {
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
    if periods == 0 {
        return Err(ScheduleError::InvalidInput {
            field: "periods".into(),
            reason: "Period count must be at least 1".into(),
        });
    }

    let rate = monthly_rate(annual_rate_percent);
    if rate.is_zero() {
        return Ok(round_money(principal / Decimal::from(periods)));
    }

    let overflow = || ScheduleError::InvalidInput {
        field: "periods".into(),
        reason: format!("Compounding over {periods} periods overflows"),
    };
    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(overflow)?;

    match principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
    {
        Some(payment) => Ok(round_money(payment)),
        None => Err(overflow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_level_payment_three_year_loan() {
        assert_eq!(level_payment(dec!(35000), dec!(8), 36).unwrap(), dec!(1096.77));
    }

    #[test]
    fn test_level_payment_thirty_year_mortgage() {
        assert_eq!(level_payment(dec!(100000), dec!(6), 360).unwrap(), dec!(599.55));
    }

    #[test]
    fn test_level_payment_zero_rate_is_straight_line() {
        assert_eq!(level_payment(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
    }

    #[test]
    fn test_level_payment_overflow_is_invalid_input() {
        // 2^90 still fits a Decimal; the payment numerator does not.
        let err = level_payment(dec!(1000000), dec!(1200), 90).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput { ref field, .. } if field == "periods"));
    }

    #[test]
    fn test_level_payment_rejects_bad_terms() {
        assert!(level_payment(Decimal::ZERO, dec!(5), 12).is_err());
        assert!(level_payment(dec!(1000), dec!(-1), 12).is_err());
        assert!(level_payment(dec!(1000), dec!(5), 0).is_err());
    }
}
