//! Lay out every pipeline result as a named workbook table

use super::table::{Cell, Table, Workbook};
use crate::data::normalize::{PRODUCT_FAMILY, PRODUCT_NAME};
use crate::kpi::ParBucket;
use crate::pipeline::PortfolioReport;

pub const CONTRACTS_CLEANED: &str = "Contracts_Cleaned";
pub const PAYMENTS_CLEANED: &str = "Payments_Cleaned";
pub const COLLECTION_RATE_TREND: &str = "Collection_Rate_Trend";
pub const REPAYMENT_RATE_TREND: &str = "Repayment_Rate_Trend";
pub const PAR_TREND: &str = "PAR_Trend";
pub const VINTAGE_ANALYSIS: &str = "Vintage_Analysis";
pub const PRODUCT_COLLECTION_RATE: &str = "Product_Collection_Rate";
pub const FPD_RATE_TREND: &str = "FPD_Rate_Trend";
pub const CASH_FLOW: &str = "Cash_Flow";
pub const CASHFLOW_PROJECTION: &str = "Cashflow_Projection";
pub const PORTFOLIO_VALUE: &str = "Portfolio_Value";

/// Table names in workbook order
pub const TABLE_NAMES: [&str; 11] = [
    CONTRACTS_CLEANED,
    PAYMENTS_CLEANED,
    COLLECTION_RATE_TREND,
    REPAYMENT_RATE_TREND,
    PAR_TREND,
    VINTAGE_ANALYSIS,
    PRODUCT_COLLECTION_RATE,
    FPD_RATE_TREND,
    CASH_FLOW,
    CASHFLOW_PROJECTION,
    PORTFOLIO_VALUE,
];

pub fn build_workbook(report: &PortfolioReport) -> Workbook {
    Workbook {
        tables: vec![
            contracts_table(report),
            payments_table(report),
            collection_table(report),
            repayment_table(report),
            par_table(report),
            vintage_table(report),
            product_table(report),
            fpd_table(report),
            cash_flow_table(report),
            projection_table(report),
            portfolio_value_table(report),
        ],
    }
}

fn contracts_table(report: &PortfolioReport) -> Table {
    let set = &report.contracts;
    let mut columns: Vec<String> = [
        "contract_id",
        "company",
        "contract_type",
        "registration_date",
        "contract_tenor_days",
        "daily_payment_amount_usd",
        "down_payment_usd",
        "contract_value_usd",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    if set.has_product_columns {
        columns.push(PRODUCT_NAME.to_string());
        columns.push(PRODUCT_FAMILY.to_string());
    }
    columns.extend(set.extra_columns.iter().cloned());
    columns.extend(
        ["first_full_month", "total_paid", "cumulative_paid", "start_month", "end_month", "vintage", "fpd_month"]
            .iter()
            .map(|c| c.to_string()),
    );

    let mut table = Table::new(CONTRACTS_CLEANED, &columns);
    for c in &set.contracts {
        let mut row: Vec<Cell> = vec![
            c.contract_id.as_str().into(),
            c.company.as_str().into(),
            c.contract_type.as_str().into(),
            c.registration_date.into(),
            c.contract_tenor_days.map(Cell::Integer).unwrap_or_else(|| Cell::from("")),
            c.daily_payment_amount_usd.into(),
            c.down_payment_usd.into(),
            c.contract_value_usd.into(),
        ];
        if set.has_product_columns {
            row.push(c.product_name_key().into());
            row.push(c.product_family_key().into());
        }
        row.extend(c.extra.iter().map(|v| Cell::from(v.as_str())));
        row.extend([
            Cell::from(c.first_full_month),
            Cell::from(c.total_paid),
            Cell::from(c.cumulative_paid),
            Cell::from(c.start_month()),
            Cell::from(c.end_month()),
            Cell::from(c.vintage()),
            Cell::from(c.fpd_month(report.config.fpd_cutoff_day)),
        ]);
        table.push(row);
    }
    table
}

fn payments_table(report: &PortfolioReport) -> Table {
    let set = &report.payments;
    let mut columns: Vec<String> = vec!["contract_id".into(), "pay_month".into(), "total_paid".into()];
    columns.extend(set.extra_columns.iter().cloned());
    columns.push("company".into());
    columns.push("month".into());

    let mut table = Table::new(PAYMENTS_CLEANED, &columns);
    for p in &set.payments {
        let mut row: Vec<Cell> = vec![p.contract_id.as_str().into(), p.pay_month.into(), p.total_paid.into()];
        row.extend(p.extra.iter().map(|v| Cell::from(v.as_str())));
        row.push(p.company.clone().unwrap_or_default().into());
        row.push(p.month().into());
        table.push(row);
    }
    table
}

fn collection_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(
        COLLECTION_RATE_TREND,
        &[
            "company",
            "month",
            "expected_payment",
            "total_paid",
            "collection_rate",
            "cum_total_paid",
            "cum_expected_payment",
            "repayment_rate",
        ],
    );
    for r in &report.kpis.collection {
        table.push(vec![
            r.company.as_str().into(),
            r.month.into(),
            r.expected_payment.into(),
            r.total_paid.into(),
            r.collection_rate.into(),
            r.cum_total_paid.into(),
            r.cum_expected_payment.into(),
            r.repayment_rate.into(),
        ]);
    }
    table
}

fn repayment_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(REPAYMENT_RATE_TREND, &["company", "month", "repayment_rate"]);
    for r in &report.kpis.collection {
        table.push(vec![r.company.as_str().into(), r.month.into(), r.repayment_rate.into()]);
    }
    table
}

fn par_table(report: &PortfolioReport) -> Table {
    let mut columns = vec!["company".to_string(), "month".to_string()];
    columns.extend(ParBucket::ALL.iter().map(|b| b.label().to_string()));
    columns.push("Total_PAR".to_string());
    columns.extend(ParBucket::ALL.iter().map(|b| format!("{}_pct", b.label())));

    let mut table = Table::new(PAR_TREND, &columns);
    for r in &report.kpis.par {
        let mut row: Vec<Cell> = vec![r.company.as_str().into(), r.month.into()];
        row.extend(ParBucket::ALL.iter().map(|b| Cell::from(r.amount(*b))));
        row.push(r.total.into());
        row.extend(ParBucket::ALL.iter().map(|b| Cell::from(r.share(*b))));
        table.push(row);
    }
    table
}

fn vintage_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(
        VINTAGE_ANALYSIS,
        &["company", "vintage", "months_on_book", "expected_payment", "total_paid", "collection_rate"],
    );
    for r in &report.kpis.vintage {
        table.push(vec![
            r.company.as_str().into(),
            r.vintage.into(),
            r.months_on_book.into(),
            r.expected_payment.into(),
            r.total_paid.into(),
            r.collection_rate.into(),
        ]);
    }
    table
}

fn product_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(
        PRODUCT_COLLECTION_RATE,
        &["company", "month", PRODUCT_NAME, PRODUCT_FAMILY, "expected_payment", "total_paid", "collection_rate"],
    );
    for r in &report.kpis.product {
        table.push(vec![
            r.company.as_str().into(),
            r.month.into(),
            r.product_name.as_str().into(),
            r.product_family.as_str().into(),
            r.expected_payment.into(),
            r.total_paid.into(),
            r.collection_rate.into(),
        ]);
    }
    table
}

fn fpd_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(
        FPD_RATE_TREND,
        &[
            "company",
            "reg_month",
            "fpd_month",
            "contracts",
            "FPD_count",
            "FPD_rate",
            "FPD_zero_count",
            "FPD_zero_rate",
        ],
    );
    for r in &report.kpis.fpd {
        table.push(vec![
            r.company.as_str().into(),
            r.registration_month.into(),
            r.fpd_month.into(),
            r.contracts.into(),
            r.fpd_count.into(),
            r.fpd_rate.into(),
            r.fpd_zero_count.into(),
            r.fpd_zero_rate.into(),
        ]);
    }
    table
}

fn cash_flow_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(
        CASH_FLOW,
        &[
            "company",
            PRODUCT_FAMILY,
            PRODUCT_NAME,
            "month",
            "disbursed_amount",
            "expected_payment",
            "total_paid",
            "net_cash_flow",
            "cumulative_net_cash_flow",
        ],
    );
    for r in &report.cash_flow {
        table.push(vec![
            r.company.as_str().into(),
            r.product_family.as_str().into(),
            r.product_name.as_str().into(),
            r.month.into(),
            r.disbursed_amount.into(),
            r.expected_payment.into(),
            r.total_paid.into(),
            r.net_cash_flow.into(),
            r.cumulative_net_cash_flow.into(),
        ]);
    }
    table
}

fn projection_table(report: &PortfolioReport) -> Table {
    let mut table = Table::new(CASHFLOW_PROJECTION, &["month", "contract_id", "company", "expected_payment"]);
    for r in &report.projection {
        table.push(vec![
            r.month.into(),
            r.contract_id.as_str().into(),
            r.company.as_str().into(),
            r.expected_payment.into(),
        ]);
    }
    table
}

fn portfolio_value_table(report: &PortfolioReport) -> Table {
    let valuation = &report.valuation;
    let mut table = Table::new(PORTFOLIO_VALUE, &["Metric", "Value"]);
    table.push(vec![
        format!(
            "Estimated Portfolio Value ({}-month discounted cash flow)",
            valuation.months.len()
        )
        .into(),
        valuation.portfolio_value.into(),
    ]);
    table.push(vec!["Annual discount rate".into(), valuation.annual_rate.into()]);
    table.push(vec!["Monthly discount rate".into(), valuation.monthly_rate.into()]);
    for m in &valuation.months {
        table.push(vec![
            format!("Discounted cash flow {}", m.month.format("%Y-%m")).into(),
            m.discounted_cashflow.into(),
        ]);
    }
    table
}
