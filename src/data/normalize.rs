//! Data normalizer: canonical column names, dedup, typed dates and amounts

use super::loader::RawTable;
use super::records::{Contract, ContractSet, ContractType, Payment, PaymentSet};
use crate::calendar::{format_date, is_date_column, month_start_after, parse_date};
use crate::error::KpiResult;
use std::collections::HashSet;

pub const CONTRACT_ID: &str = "contract_id";
pub const PRODUCT_NAME: &str = "baseunit_productname";
pub const PRODUCT_FAMILY: &str = "product_family";

/// Columns the typed records consume; everything else passes through
const CONTRACT_COLUMNS: [&str; 10] = [
    CONTRACT_ID,
    "company",
    "contract_type",
    "registration_date",
    "contract_tenor_days",
    "daily_payment_amount_usd",
    "down_payment_usd",
    "contract_value_usd",
    PRODUCT_NAME,
    PRODUCT_FAMILY,
];
const PAYMENT_COLUMNS: [&str; 3] = [CONTRACT_ID, "pay_month", "total_paid"];

/// Columns the pipeline appends to each cleaned table. Input columns with
/// these names are dropped so the output headers stay unique.
const DERIVED_CONTRACT_COLUMNS: [&str; 7] = [
    "first_full_month",
    "total_paid",
    "cumulative_paid",
    "start_month",
    "end_month",
    "vintage",
    "fpd_month",
];
const DERIVED_PAYMENT_COLUMNS: [&str; 2] = ["company", "month"];

/// Rename variant spellings of the key column (`contractid`, `ContractID`,
/// `contract id`) to `contract_id`
pub fn canonicalize_headers(table: &mut RawTable) {
    if table.has_column(CONTRACT_ID) {
        return;
    }
    for header in table.headers.iter_mut() {
        let squashed: String = header
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if squashed == "contractid" {
            log::debug!("Renaming column '{}' to '{}' in {}", header, CONTRACT_ID, table.name);
            *header = CONTRACT_ID.to_string();
            return;
        }
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_days(raw: &str) -> Option<i64> {
    parse_amount(raw).map(|v| v.floor() as i64)
}

fn optional_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Extra columns and their cells, date-like ones re-rendered as ISO dates
struct Passthrough {
    columns: Vec<(usize, String, bool)>,
}

impl Passthrough {
    fn new(table: &RawTable, consumed: &[&str], derived: &[&str]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for (idx, header) in table.headers.iter().enumerate() {
            if consumed.contains(&header.as_str()) {
                continue;
            }
            if derived.contains(&header.as_str()) || !seen.insert(header.as_str()) {
                log::warn!("Dropping input column '{}' from {}; the name is already taken", header, table.name);
                continue;
            }
            columns.push((idx, header.clone(), is_date_column(header)));
        }
        Self { columns }
    }

    fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(_, name, _)| name.clone()).collect()
    }

    fn cells(&self, row: &[String]) -> Vec<String> {
        self.columns
            .iter()
            .map(|(idx, _, is_date)| {
                let raw = RawTable::cell(row, *idx);
                if *is_date {
                    format_date(parse_date(raw))
                } else {
                    raw.to_string()
                }
            })
            .collect()
    }
}

/// Build typed contracts from the raw contract table
pub fn normalize_contracts(mut table: RawTable) -> KpiResult<ContractSet> {
    canonicalize_headers(&mut table);

    let id_idx = table.require_column(CONTRACT_ID)?;
    let company_idx = table.require_column("company")?;
    let type_idx = table.require_column("contract_type")?;
    let reg_idx = table.require_column("registration_date")?;
    let tenor_idx = table.require_column("contract_tenor_days")?;
    let daily_idx = table.require_column("daily_payment_amount_usd")?;
    let down_idx = table.column_index("down_payment_usd");
    let value_idx = table.column_index("contract_value_usd");
    let name_idx = table.column_index(PRODUCT_NAME);
    let family_idx = table.column_index(PRODUCT_FAMILY);

    if value_idx.is_none() {
        log::warn!("contract_value_usd absent from {}; disbursements default to 0", table.name);
    }

    let passthrough = Passthrough::new(&table, &CONTRACT_COLUMNS, &DERIVED_CONTRACT_COLUMNS);
    let mut seen = HashSet::new();
    let mut contracts = Vec::with_capacity(table.rows.len());
    let mut duplicates = 0usize;
    let mut bad_dates = 0usize;

    for row in &table.rows {
        let contract_id = RawTable::cell(row, id_idx).trim().to_string();
        if !seen.insert(contract_id.clone()) {
            duplicates += 1;
            continue;
        }

        let registration_date = parse_date(RawTable::cell(row, reg_idx));
        if registration_date.is_none() {
            bad_dates += 1;
        }

        let cell_or_blank = |idx: Option<usize>| idx.map(|i| RawTable::cell(row, i)).unwrap_or("");

        contracts.push(Contract {
            contract_id,
            company: RawTable::cell(row, company_idx).trim().to_string(),
            contract_type: ContractType::parse(RawTable::cell(row, type_idx)),
            registration_date,
            contract_tenor_days: parse_days(RawTable::cell(row, tenor_idx)),
            daily_payment_amount_usd: parse_amount(RawTable::cell(row, daily_idx)).unwrap_or(0.0),
            down_payment_usd: parse_amount(cell_or_blank(down_idx)).unwrap_or(0.0),
            contract_value_usd: parse_amount(cell_or_blank(value_idx)).unwrap_or(0.0),
            product_name: optional_text(cell_or_blank(name_idx)),
            product_family: optional_text(cell_or_blank(family_idx)),
            first_full_month: registration_date.and_then(|d| month_start_after(d, 1)),
            total_paid: 0.0,
            cumulative_paid: 0.0,
            extra: passthrough.cells(row),
        });
    }

    if duplicates > 0 {
        log::info!("Dropped {} duplicate contract rows", duplicates);
    }
    if bad_dates > 0 {
        log::warn!("{} contracts have a missing or unparsable registration_date", bad_dates);
    }
    let unbounded = contracts
        .iter()
        .filter(|c| c.registration_date.is_some() && c.contract_tenor_days.is_some() && c.end_date().is_none())
        .count();
    if unbounded > 0 {
        log::warn!("{} contracts have a contract_tenor_days outside the calendar; they get no schedule", unbounded);
    }

    Ok(ContractSet {
        contracts,
        extra_columns: passthrough.names(),
        has_product_columns: name_idx.is_some() && family_idx.is_some(),
    })
}

/// Build typed payments from the raw payment table
pub fn normalize_payments(mut table: RawTable) -> KpiResult<PaymentSet> {
    canonicalize_headers(&mut table);

    let id_idx = table.require_column(CONTRACT_ID)?;
    let month_idx = table.require_column("pay_month")?;
    let paid_idx = table.column_index("total_paid");

    let passthrough = Passthrough::new(&table, &PAYMENT_COLUMNS, &DERIVED_PAYMENT_COLUMNS);
    let mut bad_dates = 0usize;

    let payments: Vec<Payment> = table
        .rows
        .iter()
        .map(|row| {
            let pay_month = parse_date(RawTable::cell(row, month_idx));
            if pay_month.is_none() {
                bad_dates += 1;
            }
            Payment {
                contract_id: RawTable::cell(row, id_idx).trim().to_string(),
                pay_month,
                total_paid: paid_idx
                    .and_then(|i| parse_amount(RawTable::cell(row, i)))
                    .unwrap_or(0.0),
                company: None,
                extra: passthrough.cells(row),
            }
        })
        .collect();

    if bad_dates > 0 {
        log::warn!("{} payments have a missing or unparsable pay_month", bad_dates);
    }

    Ok(PaymentSet { payments, extra_columns: passthrough.names() })
}
