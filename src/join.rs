//! Contract-payment joiner
//!
//! Attaches per-contract payment totals to contracts and the owning company
//! to payments. The company lookup is keyed on `contract_id` alone, so an
//! unmatched foreign key leaves that payment without a company rather than
//! disturbing any other column.

use crate::data::{ContractSet, PaymentSet};
use crate::error::{KpiError, KpiResult};
use std::collections::HashMap;

/// Foreign-key health of the payment → contract join
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinDiagnostics {
    pub matched_payments: usize,
    pub unmatched_payments: usize,
    /// Distinct unknown contract ids, in first-seen order
    pub unknown_contract_ids: Vec<String>,
}

impl JoinDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unmatched_payments == 0
    }
}

/// Sum payments per contract and set `total_paid` / `cumulative_paid`
pub fn attach_payment_totals(contracts: &mut ContractSet, payments: &PaymentSet) {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for payment in &payments.payments {
        *totals.entry(payment.contract_id.as_str()).or_insert(0.0) += payment.total_paid;
    }

    for contract in contracts.contracts.iter_mut() {
        let paid = totals.get(contract.contract_id.as_str()).copied().unwrap_or(0.0);
        contract.total_paid = paid;
        contract.cumulative_paid = paid + contract.down_payment_usd;
    }
}

/// Sort payments by contract then month and copy each contract's company
/// onto its payments
pub fn propagate_company(
    contracts: &ContractSet,
    payments: &mut PaymentSet,
    strict: bool,
) -> KpiResult<JoinDiagnostics> {
    payments
        .payments
        .sort_by(|a, b| a.contract_id.cmp(&b.contract_id).then(a.pay_month.cmp(&b.pay_month)));

    let companies: HashMap<&str, &str> = contracts
        .contracts
        .iter()
        .map(|c| (c.contract_id.as_str(), c.company.as_str()))
        .collect();

    let mut diagnostics = JoinDiagnostics::default();
    for payment in payments.payments.iter_mut() {
        match companies.get(payment.contract_id.as_str()) {
            Some(company) => {
                payment.company = Some(company.to_string());
                diagnostics.matched_payments += 1;
            }
            None => {
                payment.company = None;
                diagnostics.unmatched_payments += 1;
                if !diagnostics.unknown_contract_ids.contains(&payment.contract_id) {
                    diagnostics.unknown_contract_ids.push(payment.contract_id.clone());
                }
            }
        }
    }

    if !diagnostics.is_clean() {
        let first = diagnostics.unknown_contract_ids.first().cloned().unwrap_or_default();
        if strict {
            return Err(KpiError::UnmatchedPayments {
                count: diagnostics.unmatched_payments,
                first,
            });
        }
        if diagnostics.matched_payments == 0 {
            log::error!(
                "No payment matched any contract; company is empty on all {} payments (first unknown id: {})",
                diagnostics.unmatched_payments,
                first
            );
        } else {
            log::warn!(
                "{} payments across {} unknown contract ids have no company (first: {})",
                diagnostics.unmatched_payments,
                diagnostics.unknown_contract_ids.len(),
                first
            );
        }
    }

    Ok(diagnostics)
}
