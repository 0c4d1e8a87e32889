//! Collection rate per product line

use super::collection::sum_by;
use crate::data::ContractSet;
use crate::numeric::pct;
use crate::schedule::ScheduleEntry;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub company: String,
    pub month: NaiveDate,
    pub product_name: String,
    pub product_family: String,
    pub expected_payment: f64,
    pub total_paid: f64,
    pub collection_rate: f64,
}

/// Empty unless the contract input carried both product columns
pub fn product_performance(entries: &[&ScheduleEntry], contracts: &ContractSet) -> Vec<ProductRow> {
    if !contracts.has_product_columns {
        log::info!("Product columns absent; product performance table left empty");
        return Vec::new();
    }

    let products: HashMap<&str, (&str, &str)> = contracts
        .contracts
        .iter()
        .map(|c| (c.contract_id.as_str(), (c.product_name_key(), c.product_family_key())))
        .collect();

    let sums = sum_by(entries, |e| {
        let (name, family) = products.get(e.contract_id.as_str())?;
        Some((e.company.clone(), e.month, name.to_string(), family.to_string()))
    });

    sums.into_iter()
        .map(|((company, month, product_name, product_family), (expected, paid))| ProductRow {
            company,
            month,
            product_name,
            product_family,
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

    fn entry(id: &str, expected: f64, paid: f64) -> ScheduleEntry {
        ScheduleEntry {
            contract_id: id.to_string(),
            company: "Acme".to_string(),
            month: ymd(2024, 2, 1),
            expected_payment: expected,
            total_paid: paid,
        }
    }

    fn contracts(with_products: bool) -> ContractSet {
        let mut lamp = contract("C1", "Acme", ymd(2024, 1, 1), 90, 1.0);
        lamp.product_name = Some("Lamp".into());
        lamp.product_family = Some("Solar".into());
        let mut radio = contract("C2", "Acme", ymd(2024, 1, 1), 90, 1.0);
        radio.product_name = Some("Radio".into());
        radio.product_family = Some("Solar".into());
        ContractSet { contracts: vec![lamp, radio], extra_columns: Vec::new(), has_product_columns: with_products }
    }

    #[test]
    fn test_product_rates() {
        let entries = vec![entry("C1", 100.0, 40.0), entry("C2", 50.0, 50.0)];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        let rows = product_performance(&refs, &contracts(true));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name, "Lamp");
        assert_eq!(rows[0].collection_rate, 40.0);
        assert_eq!(rows[1].product_name, "Radio");
        assert_eq!(rows[1].collection_rate, 100.0);
    }

    #[test]
    fn test_missing_product_columns() {
        let entries = vec![entry("C1", 100.0, 40.0)];
        let refs: Vec<&ScheduleEntry> = entries.iter().collect();
        assert!(product_performance(&refs, &contracts(false)).is_empty());
    }
}
