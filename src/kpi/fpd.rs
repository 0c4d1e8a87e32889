//! First-payment default
//!
//! A FINANCED contract defaults on its first payment when the payments made
//! in its first due month fall short of that month's installment.

use crate::data::{ContractSet, PaymentSet};
use crate::numeric::pct;
use crate::schedule::ScheduleEntry;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// First-payment outcome of one contract
#[derive(Debug, Clone, PartialEq)]
pub struct FpdOutcome {
    pub contract_id: String,
    pub company: String,
    pub registration_month: NaiveDate,
    pub fpd_month: NaiveDate,
    pub expected_payment: f64,
    pub fpd_total_paid: f64,
}

impl FpdOutcome {
    pub fn is_default(&self) -> bool {
        self.fpd_total_paid < self.expected_payment
    }

    pub fn is_zero(&self) -> bool {
        self.fpd_total_paid == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpdRow {
    pub company: String,
    pub registration_month: NaiveDate,
    pub fpd_month: NaiveDate,
    pub contracts: usize,
    pub fpd_count: usize,
    pub fpd_rate: f64,
    pub fpd_zero_count: usize,
    pub fpd_zero_rate: f64,
}

/// Per-contract outcomes for FINANCED contracts that have a schedule entry
/// in their FPD month
pub fn fpd_outcomes(
    entries: &[&ScheduleEntry],
    contracts: &ContractSet,
    payments: &PaymentSet,
    cutoff_day: u32,
) -> Vec<FpdOutcome> {
    let expected: HashMap<(&str, NaiveDate), f64> = entries
        .iter()
        .map(|e| ((e.contract_id.as_str(), e.month), e.expected_payment))
        .collect();

    let mut paid: HashMap<(&str, &str, NaiveDate), f64> = HashMap::new();
    for payment in &payments.payments {
        if let (Some(company), Some(month)) = (payment.company.as_deref(), payment.month()) {
            *paid.entry((payment.contract_id.as_str(), company, month)).or_insert(0.0) += payment.total_paid;
        }
    }

    let mut outcomes = Vec::new();
    let mut unscheduled = 0usize;
    for contract in contracts.contracts.iter().filter(|c| c.contract_type.is_financed()) {
        let (Some(reg_month), Some(fpd_month)) = (contract.start_month(), contract.fpd_month(cutoff_day)) else {
            continue;
        };
        let Some(expected_payment) = expected.get(&(contract.contract_id.as_str(), fpd_month)) else {
            unscheduled += 1;
            continue;
        };
        let fpd_total_paid = paid
            .get(&(contract.contract_id.as_str(), contract.company.as_str(), fpd_month))
            .copied()
            .unwrap_or(0.0);

        outcomes.push(FpdOutcome {
            contract_id: contract.contract_id.clone(),
            company: contract.company.clone(),
            registration_month: reg_month,
            fpd_month,
            expected_payment: *expected_payment,
            fpd_total_paid,
        });
    }

    if unscheduled > 0 {
        log::debug!("{} financed contracts have no installment in their FPD month", unscheduled);
    }
    outcomes
}

/// FPD and FPD-zero rates per (company, registration month, FPD month)
pub fn fpd_trend(outcomes: &[FpdOutcome]) -> Vec<FpdRow> {
    let mut counts: BTreeMap<(String, NaiveDate, NaiveDate), (usize, usize, usize)> = BTreeMap::new();
    for outcome in outcomes {
        let slot = counts
            .entry((outcome.company.clone(), outcome.registration_month, outcome.fpd_month))
            .or_insert((0, 0, 0));
        slot.0 += 1;
        slot.1 += usize::from(outcome.is_default());
        slot.2 += usize::from(outcome.is_zero());
    }

    counts
        .into_iter()
        .map(|((company, registration_month, fpd_month), (total, defaults, zeros))| FpdRow {
            company,
            registration_month,
            fpd_month,
            contracts: total,
            fpd_count: defaults,
            fpd_rate: pct(defaults as f64, total as f64),
            fpd_zero_count: zeros,
            fpd_zero_rate: pct(zeros as f64, total as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{contract, payment, ymd};
    use crate::data::ContractType;
    use crate::schedule::build_schedule;

    fn portfolio() -> (ContractSet, PaymentSet) {
        // Day 3: FPD month is February (29 days in 2024 → 290 due)
        let early = contract("C1", "Acme", ymd(2024, 1, 3), 120, 10.0);
        // Day 20: FPD month is March (310 due)
        let late_paid = contract("C2", "Acme", ymd(2024, 1, 20), 120, 10.0);
        let late_partial = contract("C3", "Acme", ymd(2024, 1, 25), 120, 10.0);
        let mut cash = contract("C4", "Acme", ymd(2024, 1, 25), 120, 10.0);
        cash.contract_type = ContractType::Other("CASH".into());

        let contracts = ContractSet {
            contracts: vec![early, late_paid, late_partial, cash],
            ..Default::default()
        };
        let payments = PaymentSet {
            payments: vec![
                payment("C1", "Acme", ymd(2024, 1, 28), 500.0),
                payment("C2", "Acme", ymd(2024, 3, 2), 200.0),
                payment("C2", "Acme", ymd(2024, 3, 20), 110.0),
                payment("C3", "Acme", ymd(2024, 3, 9), 100.0),
            ],
            extra_columns: Vec::new(),
        };
        (contracts, payments)
    }

    #[test]
    fn test_fpd_outcomes() {
        let (contracts, payments) = portfolio();
        let schedule = build_schedule(&contracts, &payments);
        let financed = schedule.financed(&contracts);
        let outcomes = fpd_outcomes(&financed, &contracts, &payments, 5);

        assert_eq!(outcomes.len(), 3);
        let c1 = &outcomes[0];
        assert_eq!(c1.fpd_month, ymd(2024, 2, 1));
        assert_eq!(c1.expected_payment, 290.0);
        // Paid in January, nothing in February
        assert!(c1.is_default());
        assert!(c1.is_zero());

        let c2 = &outcomes[1];
        assert_eq!(c2.fpd_month, ymd(2024, 3, 1));
        assert_eq!(c2.fpd_total_paid, 310.0);
        assert!(!c2.is_default());

        let c3 = &outcomes[2];
        assert!(c3.is_default());
        assert!(!c3.is_zero());
    }

    #[test]
    fn test_fpd_trend_rates() {
        let (contracts, payments) = portfolio();
        let schedule = build_schedule(&contracts, &payments);
        let financed = schedule.financed(&contracts);
        let rows = fpd_trend(&fpd_outcomes(&financed, &contracts, &payments, 5));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fpd_month, ymd(2024, 2, 1));
        assert_eq!(rows[0].contracts, 1);
        assert_eq!(rows[0].fpd_rate, 100.0);
        assert_eq!(rows[0].fpd_zero_rate, 100.0);

        assert_eq!(rows[1].fpd_month, ymd(2024, 3, 1));
        assert_eq!(rows[1].contracts, 2);
        assert_eq!(rows[1].fpd_count, 1);
        assert_eq!(rows[1].fpd_rate, 50.0);
        assert_eq!(rows[1].fpd_zero_count, 0);
        assert_eq!(rows[1].fpd_zero_rate, 0.0);
    }

    #[test]
    fn test_contract_ending_before_fpd_month_is_excluded() {
        let short = contract("C1", "Acme", ymd(2024, 1, 20), 10, 10.0);
        let contracts = ContractSet { contracts: vec![short], ..Default::default() };
        let payments = PaymentSet::default();
        let schedule = build_schedule(&contracts, &payments);
        let financed = schedule.financed(&contracts);
        assert!(fpd_outcomes(&financed, &contracts, &payments, 5).is_empty());
        assert!(fpd_trend(&[]).is_empty());
    }
}
