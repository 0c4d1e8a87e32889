//! Historical cash flow: disbursements out, installments in

use crate::data::ContractSet;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// (company, product family, product name, month)
type FlowKey = (String, String, String, NaiveDate);

#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowRow {
    pub company: String,
    pub product_family: String,
    pub product_name: String,
    pub month: NaiveDate,
    pub disbursed_amount: f64,
    pub expected_payment: f64,
    pub total_paid: f64,
    pub net_cash_flow: f64,
    pub cumulative_net_cash_flow: f64,
}

#[derive(Default)]
struct FlowSums {
    disbursed: f64,
    expected: f64,
    paid: f64,
}

/// Outer join of disbursements and inflows per product line and month,
/// with the running net position per product line. Uses every contract
/// type.
pub fn cash_flow(contracts: &ContractSet, schedule: &Schedule) -> Vec<CashFlowRow> {
    let mut sums: BTreeMap<FlowKey, FlowSums> = BTreeMap::new();

    for contract in &contracts.contracts {
        let Some(month) = contract.start_month() else { continue };
        let key = (
            contract.company.clone(),
            contract.product_family_key().to_string(),
            contract.product_name_key().to_string(),
            month,
        );
        sums.entry(key).or_default().disbursed += contract.contract_value_usd;
    }

    let lines: HashMap<&str, (&str, &str)> = contracts
        .contracts
        .iter()
        .map(|c| (c.contract_id.as_str(), (c.product_family_key(), c.product_name_key())))
        .collect();

    for entry in &schedule.entries {
        let (family, name) = lines.get(entry.contract_id.as_str()).copied().unwrap_or(("", ""));
        let key = (entry.company.clone(), family.to_string(), name.to_string(), entry.month);
        let slot = sums.entry(key).or_default();
        slot.expected += entry.expected_payment;
        slot.paid += entry.total_paid;
    }

    let mut rows = Vec::with_capacity(sums.len());
    let mut line: Option<(String, String, String)> = None;
    let mut running = 0.0;
    for ((company, product_family, product_name, month), s) in sums {
        let this_line = (company.clone(), product_family.clone(), product_name.clone());
        if line.as_ref() != Some(&this_line) {
            line = Some(this_line);
            running = 0.0;
        }
        let net = s.paid - s.disbursed;
        running += net;
        rows.push(CashFlowRow {
            company,
            product_family,
            product_name,
            month,
            disbursed_amount: s.disbursed,
            expected_payment: s.expected,
            total_paid: s.paid,
            net_cash_flow: net,
            cumulative_net_cash_flow: running,
        });
    }

    log::info!("Cash flow: {} product-line months", rows.len());
    rows
}
