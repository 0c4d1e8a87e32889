//! Collection rate and cumulative repayment rate per company and month

use crate::numeric::{pct, round2};
use crate::schedule::ScheduleEntry;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    pub company: String,
    pub month: NaiveDate,
    pub expected_payment: f64,
    pub total_paid: f64,
    pub collection_rate: f64,
    pub cum_total_paid: f64,
    pub cum_expected_payment: f64,
    pub repayment_rate: f64,
}

/// Sum expected and paid over `entries` per key, in key order
pub(crate) fn sum_by<K, F>(entries: &[&ScheduleEntry], key: F) -> BTreeMap<K, (f64, f64)>
where
    K: Ord,
    F: Fn(&ScheduleEntry) -> Option<K>,
{
    let mut sums: BTreeMap<K, (f64, f64)> = BTreeMap::new();
    for entry in entries {
        if let Some(k) = key(*entry) {
            let slot = sums.entry(k).or_insert((0.0, 0.0));
            slot.0 += entry.expected_payment;
            slot.1 += entry.total_paid;
        }
    }
    sums
}

/// Collection trend for months up to and including `horizon`, with the
/// running repayment rate per company
pub fn collection_trend(entries: &[&ScheduleEntry], horizon: NaiveDate) -> Vec<CollectionRow> {
    let sums = sum_by(entries, |e| Some((e.company.clone(), e.month)));

    let mut rows = Vec::with_capacity(sums.len());
    let mut current_company: Option<String> = None;
    let (mut cum_paid, mut cum_expected) = (0.0, 0.0);

    for ((company, month), (expected, paid)) in sums {
        if month > horizon {
            continue;
        }
        if current_company.as_deref() != Some(company.as_str()) {
            current_company = Some(company.clone());
            cum_paid = 0.0;
            cum_expected = 0.0;
        }

        // Rate from the raw sums; only the reported sums are rounded
        let collection_rate = pct(paid, expected);
        let expected = round2(expected);
        let paid = round2(paid);
        cum_paid += paid;
        cum_expected += expected;

        rows.push(CollectionRow {
            company,
            month,
            expected_payment: expected,
            total_paid: paid,
            collection_rate,
            cum_total_paid: cum_paid,
            cum_expected_payment: cum_expected,
            repayment_rate: pct(cum_paid, cum_expected),
        });
    }
    rows
}
