//! Vehicle loan offers using standard monthly amortization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest annual rate (percent) the dealership will offer.
pub const MAX_INTEREST_RATE: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinanceTerms {
    pub max_interest_rate: f64,
    pub down_payment: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceOffer {
    pub final_car_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub adjusted_interest_rate: f64,
    pub monthly_payment: f64,
    pub loan_term_months: u32,
    pub total_financing_cost: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum FinanceError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("loan term must be at least one year")]
    InvalidTerm,

    #[error("maximum interest rate cannot be negative")]
    NegativeRate,

    #[error("down payment cannot be negative")]
    NegativeDownPayment,

    #[error("vehicle price must be positive")]
    InvalidPrice,

    #[error("down payment {down_payment:.2} exceeds vehicle price {price:.2}")]
    DownPaymentExceedsPrice { down_payment: f64, price: f64 },
}

/// Build the recommended offer for a vehicle at `price`.
pub fn calculate_offer(price: f64, terms: &FinanceTerms) -> Result<FinanceOffer, FinanceError> {
    if !price.is_finite() {
        return Err(FinanceError::NotFinite("price"));
    }
    if !terms.max_interest_rate.is_finite() {
        return Err(FinanceError::NotFinite("maxInterestRate"));
    }
    if !terms.down_payment.is_finite() {
        return Err(FinanceError::NotFinite("downPayment"));
    }
    if price <= 0.0 {
        return Err(FinanceError::InvalidPrice);
    }
    if terms.years == 0 {
        return Err(FinanceError::InvalidTerm);
    }
    if terms.max_interest_rate < 0.0 {
        return Err(FinanceError::NegativeRate);
    }
    if terms.down_payment < 0.0 {
        return Err(FinanceError::NegativeDownPayment);
    }
    if terms.down_payment > price {
        return Err(FinanceError::DownPaymentExceedsPrice {
            down_payment: terms.down_payment,
            price,
        });
    }

    let loan_amount = price - terms.down_payment;
    let adjusted_interest_rate = terms.max_interest_rate.min(MAX_INTEREST_RATE);
    let loan_term_months = terms.years.saturating_mul(12);

    let monthly_payment = round_cents(monthly_payment(
        loan_amount,
        adjusted_interest_rate,
        loan_term_months,
    ));
    let total_financing_cost = round_cents(monthly_payment * f64::from(loan_term_months));

    Ok(FinanceOffer {
        final_car_price: price,
        down_payment: terms.down_payment,
        loan_amount: round_cents(loan_amount),
        adjusted_interest_rate,
        monthly_payment,
        loan_term_months,
        total_financing_cost,
    })
}

/// Payment per month for `term_months` at `annual_rate_percent`.
///
/// A zero rate repays the principal in equal instalments.
pub fn monthly_payment(loan_amount: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return loan_amount;
    }

    let months = f64::from(term_months);
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;

    if monthly_rate == 0.0 {
        return loan_amount / months;
    }

    loan_amount * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
