//! Vintage curves: collection by registration cohort and months on book

use super::collection::sum_by;
use crate::data::ContractSet;
use crate::numeric::pct;
use crate::schedule::ScheduleEntry;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct VintageRow {
    pub company: String,
    pub vintage: NaiveDate,
    pub months_on_book: i64,
    pub expected_payment: f64,
    pub total_paid: f64,
    pub collection_rate: f64,
}

/// Whole 30-day periods between registration and the schedule month.
/// Negative when the month starts before the registration day.
pub fn months_on_book(registration: NaiveDate, month: NaiveDate) -> i64 {
    (month - registration).num_days().div_euclid(30)
}

pub fn vintage_analysis(entries: &[&ScheduleEntry], contracts: &ContractSet) -> Vec<VintageRow> {
    // (registration date, tenor in 30-day months)
    let cohorts: HashMap<&str, (NaiveDate, i64)> = contracts
        .contracts
        .iter()
        .filter_map(|c| {
            let reg = c.registration_date?;
            let tenor = c.contract_tenor_days?;
            Some((c.contract_id.as_str(), (reg, tenor.div_euclid(30))))
        })
        .collect();

    let sums = sum_by(entries, |e| {
        let (reg, tenor_months) = cohorts.get(e.contract_id.as_str())?;
        let mob = months_on_book(*reg, e.month);
        if mob < 0 || mob > *tenor_months {
            return None;
        }
        Some((e.company.clone(), crate::calendar::month_start(*reg), mob))
    });

    sums.into_iter()
        .map(|((company, vintage, months_on_book), (expected, paid))| VintageRow {
            company,
            vintage,
            months_on_book,
            expected_payment: expected,
            total_paid: paid,
            collection_rate: pct(paid, expected),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{contract, ymd};
    use crate::schedule::expand_contract;

    #[test]
    fn test_months_on_book_floor() {
        let reg = ymd(2024, 1, 15);
        assert_eq!(months_on_book(reg, ymd(2024, 1, 1)), -1);
        assert_eq!(months_on_book(reg, ymd(2024, 2, 1)), 0);
        assert_eq!(months_on_book(reg, ymd(2024, 3, 1)), 1);
        assert_eq!(months_on_book(ymd(2024, 1, 1), ymd(2024, 1, 1)), 0);
    }

    #[test]
    fn test_vintage_window() {
        // Registered mid-month: the registration month falls before day 0
        let c = contract("C1", "Acme", ymd(2024, 1, 15), 60, 1.0);
        let mut entries = expand_contract(&c);
        for e in entries.iter_mut() {
            e.total_paid = e.expected_payment;
        }
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let contracts = ContractSet { contracts: vec![c], ..Default::default() };

        let rows = vintage_analysis(&refs, &contracts);
        // Jan (mob -1) dropped; Feb mob 0, Mar mob 1; tenor months = 2
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.vintage == ymd(2024, 1, 1)));
        assert_eq!(rows[0].months_on_book, 0);
        assert_eq!(rows[0].expected_payment, 29.0);
        assert_eq!(rows[1].months_on_book, 1);
        assert_eq!(rows[1].collection_rate, 100.0);
    }

    #[test]
    fn test_vintage_drops_months_past_tenor() {
        let c = contract("C1", "Acme", ymd(2024, 1, 1), 45, 1.0);
        let entries = vec![ScheduleEntry {
            contract_id: "C1".into(),
            company: "Acme".into(),
            month: ymd(2024, 3, 1),
            expected_payment: 31.0,
            total_paid: 0.0,
        }];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let contracts = ContractSet { contracts: vec![c], ..Default::default() };
        // mob = 60 / 30 = 2 > tenor months 1
        assert!(vintage_analysis(&refs, &contracts).is_empty());
    }
}
