//! End-to-end batch run
//!
//! Normalizer → joiner → schedule → KPIs → cash flow → workbook. Each stage
//! is fully materialized before the next one starts. Fetching, persisting
//! and publishing go through the injected collaborators only.

use crate::cashflow::{cash_flow, project_cashflows, value_portfolio, CashFlowRow, ProjectionRow, Valuation};
use crate::config::PipelineConfig;
use crate::data::{
    load_table_from_bytes, normalize_contracts, normalize_payments, ContractSet, PaymentSet, RawTable,
};
use crate::error::KpiResult;
use crate::external::{Publisher, SourceFetcher, WorkbookSink};
use crate::join::{attach_payment_totals, propagate_company, JoinDiagnostics};
use crate::kpi::{compute_kpis, KpiTables};
use crate::report::{build_workbook, Workbook};
use crate::schedule::{build_schedule, Schedule};
use std::path::PathBuf;
use std::time::Instant;

/// Every intermediate and final result of one run
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub config: PipelineConfig,
    pub contracts: ContractSet,
    pub payments: PaymentSet,
    pub join: JoinDiagnostics,
    pub schedule: Schedule,
    pub kpis: KpiTables,
    pub cash_flow: Vec<CashFlowRow>,
    pub projection: Vec<ProjectionRow>,
    pub valuation: Valuation,
}

impl PortfolioReport {
    pub fn workbook(&self) -> Workbook {
        build_workbook(self)
    }
}

/// Run every computation stage on already-loaded tables
pub fn compute_report(
    raw_contracts: RawTable,
    raw_payments: RawTable,
    config: &PipelineConfig,
) -> KpiResult<PortfolioReport> {
    config.validate()?;

    let mut contracts = normalize_contracts(raw_contracts)?;
    let mut payments = normalize_payments(raw_payments)?;
    log::info!(
        "Normalized {} contracts and {} payments",
        contracts.contracts.len(),
        payments.payments.len()
    );

    attach_payment_totals(&mut contracts, &payments);
    let join = propagate_company(&contracts, &mut payments, config.strict_join)?;

    let schedule = build_schedule(&contracts, &payments);
    let kpis = compute_kpis(&schedule, &contracts, &payments, config);

    let flows = cash_flow(&contracts, &schedule);
    let projection = project_cashflows(&contracts, config.projection_start, config.projection_months);
    let valuation = value_portfolio(
        &projection,
        config.projection_start,
        config.projection_months,
        config.annual_discount_rate,
    );

    Ok(PortfolioReport {
        config: config.clone(),
        contracts,
        payments,
        join,
        schedule,
        kpis,
        cash_flow: flows,
        projection,
        valuation,
    })
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub portfolio_value: f64,
    /// `(publisher, error)` for every publisher that failed
    pub publish_failures: Vec<(String, String)>,
}

/// Batch pipeline bound to its collaborators
pub struct Pipeline<'a> {
    config: PipelineConfig,
    fetcher: &'a dyn SourceFetcher,
    sink: &'a dyn WorkbookSink,
    publishers: Vec<Box<dyn Publisher + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig, fetcher: &'a dyn SourceFetcher, sink: &'a dyn WorkbookSink) -> Self {
        Self { config, fetcher, sink, publishers: Vec::new() }
    }

    pub fn with_publisher(mut self, publisher: Box<dyn Publisher + 'a>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn load(&self, name: &str, locator: &str) -> KpiResult<RawTable> {
        let bytes = self.fetcher.fetch(locator)?;
        load_table_from_bytes(name, &bytes)
    }

    /// Fetch, compute and persist. Any failure up to and including the
    /// workbook write aborts the run; publisher failures are only reported.
    pub fn run(&self, contracts_locator: &str, payments_locator: &str) -> KpiResult<RunSummary> {
        let start = Instant::now();

        let raw_contracts = self.load("contracts", contracts_locator)?;
        let raw_payments = self.load("payments", payments_locator)?;

        let report = compute_report(raw_contracts, raw_payments, &self.config)?;
        let workbook = report.workbook();
        let output = self.sink.write(&workbook)?;

        let mut publish_failures = Vec::new();
        for publisher in &self.publishers {
            match publisher.publish(&output) {
                Ok(()) => log::info!("Publisher '{}' completed", publisher.name()),
                Err(err) => {
                    log::error!("Publisher '{}' failed: {:#}", publisher.name(), err);
                    publish_failures.push((publisher.name().to_string(), format!("{:#}", err)));
                }
            }
        }

        log::info!("Run complete in {:?}", start.elapsed());
        Ok(RunSummary {
            output,
            portfolio_value: report.valuation.portfolio_value,
            publish_failures,
        })
    }
}
