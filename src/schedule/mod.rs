//! Expected-vs-actual schedule builder
//!
//! Expands every contract into one entry per calendar month of its tenor
//! and matches the payments received in each of those months.

use crate::calendar::{days_in_month, months_inclusive};
use crate::data::{Contract, ContractSet, PaymentSet};
use crate::numeric::round2;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// One contract-month of the repayment schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub contract_id: String,
    pub company: String,
    pub month: NaiveDate,
    pub expected_payment: f64,
    pub total_paid: f64,
}

impl ScheduleEntry {
    /// Paid less than was due this month
    pub fn is_miss(&self) -> bool {
        self.total_paid < self.expected_payment
    }
}

/// Full schedule, ordered by contract (input order) then month
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

/// Installment due in `month`: daily rate times the days in that month
pub fn expected_for_month(daily_payment: f64, month: NaiveDate) -> f64 {
    round2(daily_payment * days_in_month(month) as f64)
}

/// Expected rows for one contract; empty when either endpoint is unknown
pub fn expand_contract(contract: &Contract) -> Vec<ScheduleEntry> {
    let (Some(start), Some(end)) = (contract.start_month(), contract.end_month()) else {
        return Vec::new();
    };
    months_inclusive(start, end)
        .into_iter()
        .map(|month| ScheduleEntry {
            contract_id: contract.contract_id.clone(),
            company: contract.company.clone(),
            month,
            expected_payment: expected_for_month(contract.daily_payment_amount_usd, month),
            total_paid: 0.0,
        })
        .collect()
}

type ActualKey = (String, String, NaiveDate);

/// Payments summed per (contract, company, month) and rounded to cents.
/// Payments without a month or without a matched company are skipped.
pub fn actual_by_month(payments: &PaymentSet) -> HashMap<ActualKey, f64> {
    let mut sums: HashMap<ActualKey, f64> = HashMap::new();
    for payment in &payments.payments {
        let (Some(month), Some(company)) = (payment.month(), payment.company.as_ref()) else {
            continue;
        };
        *sums
            .entry((payment.contract_id.clone(), company.clone(), month))
            .or_insert(0.0) += payment.total_paid;
    }
    for value in sums.values_mut() {
        *value = round2(*value);
    }
    sums
}

/// Build the matched schedule for every contract with known start and end
pub fn build_schedule(contracts: &ContractSet, payments: &PaymentSet) -> Schedule {
    let expanded: Vec<Vec<ScheduleEntry>> = contracts
        .contracts
        .par_iter()
        .map(expand_contract)
        .collect();

    let skipped = expanded.iter().filter(|rows| rows.is_empty()).count();
    if skipped > 0 {
        log::warn!("{} contracts have no schedule (missing dates or tenor)", skipped);
    }

    let actual = actual_by_month(payments);
    let mut entries: Vec<ScheduleEntry> = expanded.into_iter().flatten().collect();
    for entry in entries.iter_mut() {
        let key = (entry.contract_id.clone(), entry.company.clone(), entry.month);
        entry.total_paid = actual.get(&key).copied().unwrap_or(0.0);
    }

    log::info!("Schedule built: {} contract-months", entries.len());
    Schedule { entries }
}

impl Schedule {
    /// Entries of FINANCED contracts only
    pub fn financed(&self, contracts: &ContractSet) -> Vec<&ScheduleEntry> {
        let financed: HashSet<&str> = contracts
            .contracts
            .iter()
            .filter(|c| c.contract_type.is_financed())
            .map(|c| c.contract_id.as_str())
            .collect();
        self.entries
            .iter()
            .filter(|e| financed.contains(e.contract_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{contract, payment, ymd};
    use crate::data::ContractType;

    #[test]
    fn test_expected_payment_january() {
        let c = contract("C1", "Acme", ymd(2024, 1, 1), 90, 10.0);
        let rows = expand_contract(&c);
        assert_eq!(rows[0].month, ymd(2024, 1, 1));
        assert_eq!(rows[0].expected_payment, 310.0);
        assert_eq!(rows[1].expected_payment, 290.0);
    }

    #[test]
    fn test_schedule_months_contiguous_and_inclusive() {
        let c = contract("C1", "Acme", ymd(2024, 10, 20), 200, 3.333);
        let rows = expand_contract(&c);
        // 2024-10-20 + 200 days = 2025-05-08
        let months: Vec<NaiveDate> = rows.iter().map(|r| r.month).collect();
        assert_eq!(months.first(), Some(&ymd(2024, 10, 1)));
        assert_eq!(months.last(), Some(&ymd(2025, 5, 1)));
        assert_eq!(months.len(), 8);
        for pair in months.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(crate::calendar::month_start_after(pair[0], 1), Some(pair[1]));
        }
        for row in &rows {
            assert_eq!(row.expected_payment, round2(3.333 * days_in_month(row.month) as f64));
        }
    }

    #[test]
    fn test_contract_without_tenor_is_skipped() {
        let mut c = contract("C1", "Acme", ymd(2024, 1, 1), 90, 10.0);
        c.contract_tenor_days = None;
        assert!(expand_contract(&c).is_empty());
    }

    #[test]
    fn test_build_schedule_matches_payments() {
        let c1 = contract("C1", "Acme", ymd(2024, 1, 10), 40, 10.0);
        let mut c2 = contract("C2", "Acme", ymd(2024, 1, 10), 10, 1.0);
        c2.contract_type = ContractType::Other("CASH".to_string());
        let contracts = ContractSet { contracts: vec![c1, c2], ..Default::default() };
        let payments = PaymentSet {
            payments: vec![
                payment("C1", "Acme", ymd(2024, 1, 12), 100.004),
                payment("C1", "Acme", ymd(2024, 1, 25), 50.0),
                payment("C1", "Acme", ymd(2024, 5, 1), 80.0),
            ],
            extra_columns: Vec::new(),
        };

        let schedule = build_schedule(&contracts, &payments);
        assert_eq!(schedule.entries.len(), 3);
        assert_eq!(schedule.entries[0].total_paid, 150.0);
        assert_eq!(schedule.entries[1].month, ymd(2024, 2, 1));
        assert_eq!(schedule.entries[1].total_paid, 0.0);

        let financed = schedule.financed(&contracts);
        assert_eq!(financed.len(), 2);
        assert!(financed.iter().all(|e| e.contract_id == "C1"));
    }
}
