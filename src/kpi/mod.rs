//! KPI engine: collection, repayment, PAR, vintage, product and FPD tables
//!
//! Every KPI reads the FINANCED slice of the schedule. All ratios are
//! guarded so a zero denominator yields 0.

mod collection;
mod fpd;
mod par;
mod product;
mod vintage;

pub use collection::{collection_trend, CollectionRow};
pub use fpd::{fpd_outcomes, fpd_trend, FpdOutcome, FpdRow};
pub use par::{classify, consecutive_misses, par_trend, ParBucket, ParRow};
pub use product::{product_performance, ProductRow};
pub use vintage::{months_on_book, vintage_analysis, VintageRow};

use crate::config::PipelineConfig;
use crate::data::{ContractSet, PaymentSet};
use crate::schedule::Schedule;

/// All KPI tables of one run
#[derive(Debug, Clone, Default)]
pub struct KpiTables {
    pub collection: Vec<CollectionRow>,
    pub par: Vec<ParRow>,
    pub vintage: Vec<VintageRow>,
    pub product: Vec<ProductRow>,
    pub fpd: Vec<FpdRow>,
}

pub fn compute_kpis(
    schedule: &Schedule,
    contracts: &ContractSet,
    payments: &PaymentSet,
    config: &PipelineConfig,
) -> KpiTables {
    let financed = schedule.financed(contracts);
    log::info!(
        "KPI engine: {} financed contract-months of {}",
        financed.len(),
        schedule.entries.len()
    );

    let tables = KpiTables {
        collection: collection_trend(&financed, config.reporting_horizon),
        par: par_trend(&financed, payments.latest_pay_month()),
        vintage: vintage_analysis(&financed, contracts),
        product: product_performance(&financed, contracts),
        fpd: fpd_trend(&fpd_outcomes(&financed, contracts, payments, config.fpd_cutoff_day)),
    };

    log::debug!(
        "KPI rows: collection={} par={} vintage={} product={} fpd={}",
        tables.collection.len(),
        tables.par.len(),
        tables.vintage.len(),
        tables.product.len(),
        tables.fpd.len()
    );
    tables
}
