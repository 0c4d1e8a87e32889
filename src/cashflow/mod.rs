//! Cash flow and valuation engine

mod flows;
mod valuation;

pub use flows::{cash_flow, CashFlowRow};
pub use valuation::{
    discount_factor, monthly_rate, project_cashflows, projection_window, value_portfolio,
    DiscountedMonth, ProjectionRow, Valuation,
};
