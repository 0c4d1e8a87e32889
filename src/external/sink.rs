//! Workbook persistence

use crate::error::KpiResult;
use crate::report::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "workbook.json";

/// Durable storage for the output workbook
pub trait WorkbookSink {
    /// Persist the workbook and return where it landed
    fn write(&self, workbook: &Workbook) -> KpiResult<PathBuf>;
}

/// Writes one `<table>.csv` per table plus a JSON manifest into a directory
#[derive(Debug, Clone)]
pub struct CsvWorkbookWriter {
    dir: PathBuf,
}

impl CsvWorkbookWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Render one table as CSV bytes
pub fn table_to_csv(table: &crate::report::Table) -> KpiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.render()))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

impl WorkbookSink for CsvWorkbookWriter {
    fn write(&self, workbook: &Workbook) -> KpiResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        for table in &workbook.tables {
            let path = self.dir.join(format!("{}.csv", table.name));
            fs::write(&path, table_to_csv(table)?)?;
            log::debug!("Wrote {} ({} rows)", path.display(), table.rows.len());
        }
        let manifest = serde_json::to_string_pretty(&workbook.manifest())?;
        fs::write(self.dir.join(MANIFEST_FILE), manifest)?;
        log::info!("Workbook written to {} ({} tables)", self.dir.display(), workbook.tables.len());
        Ok(self.dir.clone())
    }
}
