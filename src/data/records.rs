//! Typed contract and payment records

use crate::calendar::{month_start, month_start_after};
use chrono::{Datelike, Duration, NaiveDate};

/// Contract financing type. Only `Financed` contracts feed the
/// collection, repayment, PAR, vintage, product and FPD tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractType {
    Financed,
    Other(String),
}

impl ContractType {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text == "FINANCED" {
            ContractType::Financed
        } else {
            ContractType::Other(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContractType::Financed => "FINANCED",
            ContractType::Other(name) => name,
        }
    }

    pub fn is_financed(&self) -> bool {
        matches!(self, ContractType::Financed)
    }
}

/// One deduplicated contract row
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub contract_id: String,
    pub company: String,
    pub contract_type: ContractType,
    pub registration_date: Option<NaiveDate>,
    pub contract_tenor_days: Option<i64>,
    pub daily_payment_amount_usd: f64,
    pub down_payment_usd: f64,
    pub contract_value_usd: f64,
    pub product_name: Option<String>,
    pub product_family: Option<String>,

    /// First day of the month after registration
    pub first_full_month: Option<NaiveDate>,
    /// Sum of all payments, filled by the joiner
    pub total_paid: f64,
    /// `total_paid` plus down payment, filled by the joiner
    pub cumulative_paid: f64,

    /// Pass-through cells aligned with `ContractSet::extra_columns`
    pub extra: Vec<String>,
}

impl Contract {
    /// Registration month (also the vintage)
    pub fn start_month(&self) -> Option<NaiveDate> {
        self.registration_date.map(month_start)
    }

    /// Last calendar day the contract is active. `None` when the tenor
    /// pushes the date outside the representable calendar.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let reg = self.registration_date?;
        let tenor = self.contract_tenor_days?;
        Duration::try_days(tenor).and_then(|d| reg.checked_add_signed(d))
    }

    /// Month containing `registration_date + contract_tenor_days`
    pub fn end_month(&self) -> Option<NaiveDate> {
        self.end_date().map(month_start)
    }

    pub fn vintage(&self) -> Option<NaiveDate> {
        self.start_month()
    }

    /// Month in which the first installment is contractually due
    pub fn fpd_month(&self, cutoff_day: u32) -> Option<NaiveDate> {
        let reg = self.registration_date?;
        let offset = if reg.day() <= cutoff_day { 1 } else { 2 };
        month_start_after(reg, offset)
    }

    /// Whether the contract is active on `date` (both endpoints inclusive)
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match (self.registration_date, self.end_date()) {
            (Some(reg), Some(end)) => reg <= date && date <= end,
            _ => false,
        }
    }

    pub fn product_family_key(&self) -> &str {
        self.product_family.as_deref().unwrap_or("")
    }

    pub fn product_name_key(&self) -> &str {
        self.product_name.as_deref().unwrap_or("")
    }
}

/// One payment row
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub contract_id: String,
    pub pay_month: Option<NaiveDate>,
    pub total_paid: f64,
    /// Company of the referenced contract, `None` when unmatched
    pub company: Option<String>,
    pub extra: Vec<String>,
}

impl Payment {
    pub fn month(&self) -> Option<NaiveDate> {
        self.pay_month.map(month_start)
    }
}

/// Normalized contracts together with schema facts the KPIs depend on
#[derive(Debug, Clone, Default)]
pub struct ContractSet {
    pub contracts: Vec<Contract>,
    pub extra_columns: Vec<String>,
    /// Both `baseunit_productname` and `product_family` were in the input
    pub has_product_columns: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentSet {
    pub payments: Vec<Payment>,
    pub extra_columns: Vec<String>,
}

impl PaymentSet {
    /// Latest non-null `pay_month`
    pub fn latest_pay_month(&self) -> Option<NaiveDate> {
        self.payments.iter().filter_map(|p| p.pay_month).max()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn contract(id: &str, company: &str, reg: NaiveDate, tenor: i64, daily: f64) -> Contract {
        Contract {
            contract_id: id.to_string(),
            company: company.to_string(),
            contract_type: ContractType::Financed,
            registration_date: Some(reg),
            contract_tenor_days: Some(tenor),
            daily_payment_amount_usd: daily,
            down_payment_usd: 0.0,
            contract_value_usd: 0.0,
            product_name: None,
            product_family: None,
            first_full_month: month_start_after(reg, 1),
            total_paid: 0.0,
            cumulative_paid: 0.0,
            extra: Vec::new(),
        }
    }

    pub fn payment(id: &str, company: &str, pay_month: NaiveDate, amount: f64) -> Payment {
        Payment {
            contract_id: id.to_string(),
            pay_month: Some(pay_month),
            total_paid: amount,
            company: Some(company.to_string()),
            extra: Vec::new(),
        }
    }
}
