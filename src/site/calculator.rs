//! Mortgage and affordability calculators for the public site.

use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gross debt service limit: housing costs over gross monthly income.
pub const GDS_RATIO: Decimal = Decimal::from_parts(32, 0, 0, false, 2);
/// Total debt service limit: housing plus other debts over gross monthly income.
pub const TDS_RATIO: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

pub const MAX_AMORTIZATION_YEARS: u32 = 40;
pub const MAX_ANNUAL_RATE: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),

    #[error("Calculation overflowed")]
    Overflow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MortgageInput {
    pub principal: Decimal,
    /// Nominal annual rate in percent, e.g. `5.25`.
    pub annual_rate: Decimal,
    pub amortization_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortgageQuote {
    pub monthly_payment: Decimal,
    pub payments: u32,
    pub total_paid: Decimal,
    pub total_interest: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AffordabilityInput {
    pub annual_income: Decimal,
    #[serde(default)]
    pub monthly_debts: Decimal,
    /// Property tax, heating and condo fees per month.
    #[serde(default)]
    pub monthly_housing_costs: Decimal,
    #[serde(default)]
    pub down_payment: Decimal,
    pub annual_rate: Decimal,
    pub amortization_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordabilityQuote {
    pub max_monthly_payment: Decimal,
    pub max_loan_amount: Decimal,
    pub max_purchase_price: Decimal,
    pub gds_limit: Decimal,
    pub tds_limit: Decimal,
}

fn check_terms(annual_rate: Decimal, years: u32) -> Result<(Decimal, u32), CalcError> {
    if annual_rate.is_sign_negative() && !annual_rate.is_zero() {
        return Err(CalcError::Negative("Interest rate"));
    }
    if annual_rate > MAX_ANNUAL_RATE {
        return Err(CalcError::OutOfRange("Interest rate"));
    }
    if years == 0 {
        return Err(CalcError::NotPositive("Amortization"));
    }
    if years > MAX_AMORTIZATION_YEARS {
        return Err(CalcError::OutOfRange("Amortization"));
    }
    let monthly_rate = annual_rate / Decimal::ONE_HUNDRED / Decimal::from(12);
    Ok((monthly_rate, years * 12))
}

/// `(1 + r)^n`
fn growth(monthly_rate: Decimal, payments: u32) -> Result<Decimal, CalcError> {
    (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(payments))
        .ok_or(CalcError::Overflow)
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Level monthly payment on a fully amortizing loan. A zero rate spreads the
/// principal evenly.
pub fn mortgage_payment(input: &MortgageInput) -> Result<MortgageQuote, CalcError> {
    if input.principal <= Decimal::ZERO {
        return Err(CalcError::NotPositive("Principal"));
    }
    let (rate, payments) = check_terms(input.annual_rate, input.amortization_years)?;
    let n = Decimal::from(payments);

    let exact = if rate.is_zero() {
        input.principal / n
    } else {
        let f = growth(rate, payments)?;
        input
            .principal
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(f))
            .and_then(|v| v.checked_div(f - Decimal::ONE))
            .ok_or(CalcError::Overflow)?
    };

    let monthly_payment = money(exact);
    let total_paid = monthly_payment.checked_mul(n).ok_or(CalcError::Overflow)?;
    Ok(MortgageQuote {
        monthly_payment,
        payments,
        total_paid,
        total_interest: (total_paid - input.principal).max(Decimal::ZERO),
    })
}

/// Largest loan the income supports under both debt service ratios.
pub fn affordability(input: &AffordabilityInput) -> Result<AffordabilityQuote, CalcError> {
    if input.annual_income <= Decimal::ZERO {
        return Err(CalcError::NotPositive("Annual income"));
    }
    for (name, value) in [
        ("Monthly debts", input.monthly_debts),
        ("Monthly housing costs", input.monthly_housing_costs),
        ("Down payment", input.down_payment),
    ] {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CalcError::Negative(name));
        }
    }
    let (rate, payments) = check_terms(input.annual_rate, input.amortization_years)?;

    let monthly_income = input.annual_income / Decimal::from(12);
    let gds_limit = monthly_income * GDS_RATIO;
    let tds_limit = monthly_income * TDS_RATIO;

    let by_gds = gds_limit.checked_sub(input.monthly_housing_costs);
    let by_tds = tds_limit
        .checked_sub(input.monthly_debts)
        .and_then(|v| v.checked_sub(input.monthly_housing_costs));
    let payment = match (by_gds, by_tds) {
        (Some(g), Some(t)) => g.min(t).max(Decimal::ZERO),
        // Only huge outgoings underflow, which leaves nothing for a payment.
        _ => Decimal::ZERO,
    };

    let principal = if payment.is_zero() {
        Decimal::ZERO
    } else if rate.is_zero() {
        payment.checked_mul(Decimal::from(payments)).ok_or(CalcError::Overflow)?
    } else {
        let f = growth(rate, payments)?;
        payment
            .checked_mul(f - Decimal::ONE)
            .and_then(|v| v.checked_div(rate.checked_mul(f)?))
            .ok_or(CalcError::Overflow)?
    };

    let max_loan_amount = money(principal);
    Ok(AffordabilityQuote {
        max_monthly_payment: money(payment),
        max_loan_amount,
        max_purchase_price: max_loan_amount
            .checked_add(money(input.down_payment))
            .ok_or(CalcError::Overflow)?,
        gds_limit: money(gds_limit),
        tds_limit: money(tds_limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn standard_amortization() {
        let quote = mortgage_payment(&MortgageInput {
            principal: d("300000"),
            annual_rate: d("6"),
            amortization_years: 30,
        })
        .unwrap();
        assert_eq!(quote.monthly_payment, d("1798.65"));
        assert_eq!(quote.payments, 360);
        assert_eq!(quote.total_paid, d("647514.00"));
        assert_eq!(quote.total_interest, d("347514.00"));
    }

    #[test]
    fn zero_rate_divides_evenly() {
        let quote = mortgage_payment(&MortgageInput {
            principal: d("120000"),
            annual_rate: Decimal::ZERO,
            amortization_years: 10,
        })
        .unwrap();
        assert_eq!(quote.monthly_payment, d("1000"));
        assert_eq!(quote.total_interest, Decimal::ZERO);
    }

    #[test]
    fn rejects_bad_inputs() {
        let base = MortgageInput { principal: d("1000"), annual_rate: d("5"), amortization_years: 25 };
        assert_eq!(
            mortgage_payment(&MortgageInput { principal: Decimal::ZERO, ..base.clone() }),
            Err(CalcError::NotPositive("Principal"))
        );
        assert_eq!(
            mortgage_payment(&MortgageInput { annual_rate: d("-1"), ..base.clone() }),
            Err(CalcError::Negative("Interest rate"))
        );
        assert_eq!(
            mortgage_payment(&MortgageInput { amortization_years: 0, ..base.clone() }),
            Err(CalcError::NotPositive("Amortization"))
        );
        assert_eq!(
            mortgage_payment(&MortgageInput { amortization_years: 41, ..base }),
            Err(CalcError::OutOfRange("Amortization"))
        );
    }

    #[test]
    fn affordability_takes_tighter_ratio() {
        let input = AffordabilityInput {
            annual_income: d("120000"),
            monthly_debts: d("1500"),
            monthly_housing_costs: d("500"),
            down_payment: d("50000"),
            annual_rate: Decimal::ZERO,
            amortization_years: 25,
        };
        let quote = affordability(&input).unwrap();
        // income 10000/mo: GDS 3200 - 500 = 2700, TDS 4000 - 1500 - 500 = 2000
        assert_eq!(quote.gds_limit, d("3200.00"));
        assert_eq!(quote.tds_limit, d("4000.00"));
        assert_eq!(quote.max_monthly_payment, d("2000.00"));
        assert_eq!(quote.max_loan_amount, d("600000.00"));
        assert_eq!(quote.max_purchase_price, d("650000.00"));
    }

    #[test]
    fn affordability_never_negative() {
        let quote = affordability(&AffordabilityInput {
            annual_income: d("12000"),
            monthly_debts: d("5000"),
            monthly_housing_costs: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            annual_rate: d("5"),
            amortization_years: 25,
        })
        .unwrap();
        assert_eq!(quote.max_monthly_payment, Decimal::ZERO);
        assert_eq!(quote.max_loan_amount, Decimal::ZERO);
    }

    #[test]
    fn payment_and_affordability_agree() {
        let quote = affordability(&AffordabilityInput {
            annual_income: d("90000"),
            monthly_debts: Decimal::ZERO,
            monthly_housing_costs: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            annual_rate: d("5"),
            amortization_years: 25,
        })
        .unwrap();
        let back = mortgage_payment(&MortgageInput {
            principal: quote.max_loan_amount,
            annual_rate: d("5"),
            amortization_years: 25,
        })
        .unwrap();
        assert!((back.monthly_payment - quote.max_monthly_payment).abs() <= d("0.01"));
    }

    #[test]
    fn affordability_extreme_inputs_do_not_panic() {
        let huge = d("50000000000000000000000000000");
        let outgoings = affordability(&AffordabilityInput {
            annual_income: d("1000"),
            monthly_debts: huge,
            monthly_housing_costs: huge,
            down_payment: Decimal::ZERO,
            annual_rate: d("5"),
            amortization_years: 25,
        })
        .unwrap();
        assert_eq!(outgoings.max_monthly_payment, Decimal::ZERO);
        assert_eq!(outgoings.max_loan_amount, Decimal::ZERO);

        let income = AffordabilityInput {
            annual_income: d("70000000000000000000000000000"),
            monthly_debts: Decimal::ZERO,
            monthly_housing_costs: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            annual_rate: Decimal::ZERO,
            amortization_years: 40,
        };
        assert_eq!(affordability(&income), Err(CalcError::Overflow));

        let deposit = AffordabilityInput {
            annual_income: d("120000"),
            down_payment: Decimal::MAX,
            ..income
        };
        assert_eq!(affordability(&deposit), Err(CalcError::Overflow));
    }

    #[test]
    fn mortgage_extreme_principal_does_not_panic() {
        let result = mortgage_payment(&MortgageInput {
            principal: Decimal::MAX,
            annual_rate: d("30"),
            amortization_years: 1,
        });
        assert_eq!(result, Err(CalcError::Overflow));
    }
}
