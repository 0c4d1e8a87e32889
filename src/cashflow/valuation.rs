//! Forward cash flow projection and discounted portfolio value

use crate::calendar::{days_in_month, month_start, month_start_after};
use crate::data::{Contract, ContractSet};
use crate::numeric::round2;
use chrono::NaiveDate;
use rayon::prelude::*;

/// Installment one contract is expected to pay in a projected month
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub month: NaiveDate,
    pub contract_id: String,
    pub company: String,
    pub expected_payment: f64,
}

/// Discounting of one projected month
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedMonth {
    /// 1-based position within the projection window
    pub period: u32,
    pub month: NaiveDate,
    pub expected_payment: f64,
    pub discount_factor: f64,
    pub discounted_cashflow: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub annual_rate: f64,
    pub monthly_rate: f64,
    pub months: Vec<DiscountedMonth>,
    pub portfolio_value: f64,
}

/// Monthly rate compounding to the same effective annual rate
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// `(1 + monthly_rate)^-period`
pub fn discount_factor(monthly_rate: f64, period: u32) -> f64 {
    (1.0 + monthly_rate).powi(-(period as i32))
}

/// Month starts of the projection window
pub fn projection_window(start: NaiveDate, months: u32) -> Vec<NaiveDate> {
    (0..months).filter_map(|i| month_start_after(start, i)).collect()
}

fn project_contract(contract: &Contract, window: &[NaiveDate]) -> Vec<ProjectionRow> {
    window
        .iter()
        .filter(|month| contract.is_active_on(**month))
        .map(|month| ProjectionRow {
            month: *month,
            contract_id: contract.contract_id.clone(),
            company: contract.company.clone(),
            expected_payment: contract.daily_payment_amount_usd * days_in_month(*month) as f64,
        })
        .collect()
}

/// Expected installments per contract for every window month in which the
/// contract is active on the first of the month. Ordered by month, then
/// contract input order.
pub fn project_cashflows(contracts: &ContractSet, start: NaiveDate, months: u32) -> Vec<ProjectionRow> {
    let window = projection_window(month_start(start), months);
    let per_contract: Vec<Vec<ProjectionRow>> = contracts
        .contracts
        .par_iter()
        .map(|c| project_contract(c, &window))
        .collect();

    let mut rows: Vec<ProjectionRow> = per_contract.into_iter().flatten().collect();
    // Stable sort keeps contract order within a month
    rows.sort_by_key(|r| r.month);
    rows
}

/// Discount monthly projected totals. Every window month is present, with
/// a zero total when no contract is active.
pub fn value_portfolio(
    projection: &[ProjectionRow],
    start: NaiveDate,
    months: u32,
    annual_rate: f64,
) -> Valuation {
    let rate = monthly_rate(annual_rate);
    let discounted: Vec<DiscountedMonth> = projection_window(month_start(start), months)
        .into_iter()
        .enumerate()
        .map(|(i, month)| {
            let period = i as u32 + 1;
            let total: f64 = projection
                .iter()
                .filter(|r| r.month == month)
                .map(|r| r.expected_payment)
                .sum();
            let expected_payment = round2(total);
            let factor = discount_factor(rate, period);
            DiscountedMonth {
                period,
                month,
                expected_payment,
                discount_factor: factor,
                discounted_cashflow: expected_payment * factor,
            }
        })
        .collect();

    let portfolio_value: f64 = discounted.iter().map(|m| m.discounted_cashflow).sum();
    log::info!(
        "Portfolio value ({} months at {:.2}% annual): {:.2}",
        months,
        annual_rate * 100.0,
        portfolio_value
    );

    Valuation { annual_rate, monthly_rate: rate, months: discounted, portfolio_value }
}
