//! Pipeline configuration
//!
//! Every run-level constant (reporting horizon, FPD cutoff, projection
//! window, discount rate) lives here and is passed explicitly into the
//! KPI and valuation stages.

use crate::error::{KpiError, KpiResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters controlling a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Last month kept in the collection and repayment trends
    #[serde(default = "default_reporting_horizon")]
    pub reporting_horizon: NaiveDate,

    /// Registrations on or before this day of month owe their first
    /// payment the following month; later ones the month after
    #[serde(default = "default_fpd_cutoff_day")]
    pub fpd_cutoff_day: u32,

    /// First month of the forward cash flow projection
    #[serde(default = "default_projection_start")]
    pub projection_start: NaiveDate,

    /// Number of months projected and discounted
    #[serde(default = "default_projection_months")]
    pub projection_months: u32,

    /// Annual discount rate for the valuation (0.15 = 15%)
    #[serde(default = "default_annual_discount_rate")]
    pub annual_discount_rate: f64,

    /// Fail the run when payments reference unknown contracts
    #[serde(default)]
    pub strict_join: bool,
}

fn default_reporting_horizon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default()
}
fn default_fpd_cutoff_day() -> u32 { 5 }
fn default_projection_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 1).unwrap_or_default()
}
fn default_projection_months() -> u32 { 12 }
fn default_annual_discount_rate() -> f64 { 0.15 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reporting_horizon: default_reporting_horizon(),
            fpd_cutoff_day: default_fpd_cutoff_day(),
            projection_start: default_projection_start(),
            projection_months: default_projection_months(),
            annual_discount_rate: default_annual_discount_rate(),
            strict_join: false,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_json_path(path: &Path) -> KpiResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KpiResult<()> {
        if !(1..=31).contains(&self.fpd_cutoff_day) {
            return Err(KpiError::Config(format!(
                "fpd_cutoff_day must be within 1..=31, got {}",
                self.fpd_cutoff_day
            )));
        }
        if self.annual_discount_rate <= -1.0 || !self.annual_discount_rate.is_finite() {
            return Err(KpiError::Config(format!(
                "annual_discount_rate must be a finite rate above -100%, got {}",
                self.annual_discount_rate
            )));
        }
        Ok(())
    }
}
