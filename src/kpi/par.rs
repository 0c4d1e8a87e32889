//! Portfolio-at-risk aging
//!
//! Each contract's months are scanned in order with an explicit
//! consecutive-miss counter; the counter picks the PAR bucket for that
//! month's expected payment.

use crate::numeric::shares_pct;
use crate::schedule::ScheduleEntry;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParBucket {
    Current,
    Par30,
    Par60,
    Par90,
    Par120,
}

impl ParBucket {
    pub const ALL: [ParBucket; 5] = [
        ParBucket::Current,
        ParBucket::Par30,
        ParBucket::Par60,
        ParBucket::Par90,
        ParBucket::Par120,
    ];

    pub fn from_consecutive_misses(misses: u32) -> Self {
        match misses {
            0 => ParBucket::Current,
            1 => ParBucket::Par30,
            2 => ParBucket::Par60,
            3 => ParBucket::Par90,
            _ => ParBucket::Par120,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParBucket::Current => "Current",
            ParBucket::Par30 => "PAR30",
            ParBucket::Par60 => "PAR60",
            ParBucket::Par90 => "PAR90",
            ParBucket::Par120 => "PAR120",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Consecutive-miss count after each month of an ordered sequence.
/// A month that meets or exceeds its installment resets the count to 0.
pub fn consecutive_misses<I>(missed: I) -> Vec<u32>
where
    I: IntoIterator<Item = bool>,
{
    missed
        .into_iter()
        .scan(0u32, |count, miss| {
            *count = if miss { *count + 1 } else { 0 };
            Some(*count)
        })
        .collect()
}

/// PAR bucket of each entry, entries grouped by contract in month order
pub fn classify(entries: &[&ScheduleEntry]) -> Vec<(ScheduleEntry, ParBucket)> {
    let mut by_contract: BTreeMap<&str, Vec<&ScheduleEntry>> = BTreeMap::new();
    for entry in entries {
        by_contract.entry(entry.contract_id.as_str()).or_default().push(*entry);
    }

    let mut classified = Vec::with_capacity(entries.len());
    for (_, mut months) in by_contract {
        months.sort_by_key(|e| e.month);
        let counts = consecutive_misses(months.iter().map(|e| e.is_miss()));
        for (entry, count) in months.into_iter().zip(counts) {
            classified.push((entry.clone(), ParBucket::from_consecutive_misses(count)));
        }
    }
    classified
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParRow {
    pub company: String,
    pub month: NaiveDate,
    /// Expected payment per bucket, indexed like `ParBucket::ALL`
    pub amounts: [f64; 5],
    pub total: f64,
    /// Share of `total` per bucket in percent
    pub pct: [f64; 5],
}

impl ParRow {
    pub fn amount(&self, bucket: ParBucket) -> f64 {
        self.amounts[bucket.index()]
    }

    pub fn share(&self, bucket: ParBucket) -> f64 {
        self.pct[bucket.index()]
    }
}

/// PAR trend per company and month, truncated to months on or before the
/// latest observed payment. No payments at all yields an empty trend.
pub fn par_trend(entries: &[&ScheduleEntry], latest_pay_month: Option<NaiveDate>) -> Vec<ParRow> {
    let Some(latest) = latest_pay_month else {
        log::warn!("No dated payments; PAR trend is empty");
        return Vec::new();
    };

    let mut pivot: BTreeMap<(String, NaiveDate), [f64; 5]> = BTreeMap::new();
    for (entry, bucket) in classify(entries) {
        let amounts = pivot.entry((entry.company, entry.month)).or_insert([0.0; 5]);
        amounts[bucket.index()] += entry.expected_payment;
    }

    pivot
        .into_iter()
        .filter(|((_, month), _)| *month <= latest)
        .map(|((company, month), amounts)| {
            let total: f64 = amounts.iter().sum();
            let shares = shares_pct(&amounts);
            let mut pct = [0.0; 5];
            pct.copy_from_slice(&shares);
            ParRow { company, month, amounts, total, pct }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::ymd;
    use approx::assert_relative_eq;

    fn entry(id: &str, month: NaiveDate, expected: f64, paid: f64) -> ScheduleEntry {
        ScheduleEntry {
            contract_id: id.to_string(),
            company: "Acme".to_string(),
            month,
            expected_payment: expected,
            total_paid: paid,
        }
    }

    #[test]
    fn test_bucket_mapping() {
        assert_eq!(ParBucket::from_consecutive_misses(0), ParBucket::Current);
        assert_eq!(ParBucket::from_consecutive_misses(1), ParBucket::Par30);
        assert_eq!(ParBucket::from_consecutive_misses(2), ParBucket::Par60);
        assert_eq!(ParBucket::from_consecutive_misses(3), ParBucket::Par90);
        assert_eq!(ParBucket::from_consecutive_misses(4), ParBucket::Par120);
        assert_eq!(ParBucket::from_consecutive_misses(17), ParBucket::Par120);
    }

    #[test]
    fn test_counter_resets_after_payment() {
        let counts = consecutive_misses([false, true, true, true, true, false, true]);
        assert_eq!(counts, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_four_misses_then_recovery() {
        let months: Vec<NaiveDate> = (1..=6).map(|m| ymd(2024, m, 1)).collect();
        let paid = [100.0, 0.0, 0.0, 0.0, 0.0, 100.0];
        // Out of order on purpose; classification sorts by month
        let entries: Vec<ScheduleEntry> = months
            .iter()
            .zip(paid)
            .rev()
            .map(|(m, p)| entry("C1", *m, 100.0, p))
            .collect();
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();

        let buckets: Vec<ParBucket> = classify(&refs).into_iter().map(|(_, b)| b).collect();
        assert_eq!(
            buckets,
            vec![
                ParBucket::Current,
                ParBucket::Par30,
                ParBucket::Par60,
                ParBucket::Par90,
                ParBucket::Par120,
                ParBucket::Current,
            ]
        );
    }

    #[test]
    fn test_overpayment_counts_as_current() {
        let entries = vec![entry("C1", ymd(2024, 1, 1), 100.0, 0.0), entry("C1", ymd(2024, 2, 1), 100.0, 150.0)];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let buckets: Vec<ParBucket> = classify(&refs).into_iter().map(|(_, b)| b).collect();
        assert_eq!(buckets, vec![ParBucket::Par30, ParBucket::Current]);
    }

    #[test]
    fn test_par_trend_percentages() {
        let entries = vec![
            entry("C1", ymd(2024, 1, 1), 100.0, 100.0),
            entry("C2", ymd(2024, 1, 1), 100.0, 0.0),
            entry("C3", ymd(2024, 1, 1), 100.0, 0.0),
            entry("C1", ymd(2024, 2, 1), 100.0, 100.0),
            entry("C1", ymd(2024, 3, 1), 100.0, 100.0),
        ];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let rows = par_trend(&refs, Some(ymd(2024, 2, 14)));

        assert_eq!(rows.len(), 2);
        let jan = &rows[0];
        assert_eq!(jan.amount(ParBucket::Current), 100.0);
        assert_eq!(jan.amount(ParBucket::Par30), 200.0);
        assert_eq!(jan.total, 300.0);
        assert_relative_eq!(jan.pct.iter().sum::<f64>(), 100.0, epsilon = 0.01);
        assert_eq!(jan.share(ParBucket::Par90), 0.0);
    }

    #[test]
    fn test_zero_total_percentages() {
        let entries = vec![entry("C1", ymd(2024, 1, 1), 0.0, 0.0)];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let rows = par_trend(&refs, Some(ymd(2024, 1, 1)));
        assert_eq!(rows[0].total, 0.0);
        assert!(rows[0].pct.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_no_payments_gives_empty_trend() {
        let entries = vec![entry("C1", ymd(2024, 1, 1), 10.0, 0.0)];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        assert!(par_trend(&refs, None).is_empty());
    }
}
