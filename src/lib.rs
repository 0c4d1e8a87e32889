//! Loan portfolio credit KPIs
//!
//! Turns contract and payment records into collection, repayment,
//! portfolio-at-risk, vintage, product, first-payment-default, cash flow and
//! discounted valuation tables.

pub mod calendar;
pub mod cashflow;
pub mod config;
pub mod data;
pub mod error;
pub mod external;
pub mod join;
pub mod kpi;
pub mod numeric;
pub mod pipeline;
pub mod report;
pub mod schedule;

pub use config::PipelineConfig;
pub use data::{Contract, ContractSet, ContractType, Payment, PaymentSet};
pub use error::{KpiError, KpiResult};
pub use pipeline::{compute_report, Pipeline, PortfolioReport, RunSummary};
pub use schedule::{Schedule, ScheduleEntry};
