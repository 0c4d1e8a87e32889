//! Raw delimited-table loading

use crate::error::{KpiError, KpiResult};
use std::io::Read;

/// Header plus untyped string cells, as read from the source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn require_column(&self, column: &str) -> KpiResult<usize> {
        self.column_index(column).ok_or_else(|| KpiError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cell text, empty when the row is short
    pub fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Parse comma-delimited text with a header row
pub fn load_table_from_reader<R: Read>(name: &str, reader: R) -> KpiResult<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(KpiError::Source {
            locator: name.to_string(),
            reason: "no header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::debug!("Loaded {} rows x {} columns from {}", rows.len(), headers.len(), name);
    Ok(RawTable { name: name.to_string(), headers, rows })
}

pub fn load_table_from_bytes(name: &str, bytes: &[u8]) -> KpiResult<RawTable> {
    load_table_from_reader(name, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_table() {
        let data = "contract_id, company ,total_paid\nC1,Acme,10\nC2,Beta,\n";
        let table = load_table_from_bytes("payments", data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["contract_id", "company", "total_paid"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(RawTable::cell(&table.rows[1], 2), "");
        assert_eq!(RawTable::cell(&table.rows[1], 7), "");
    }

    #[test]
    fn test_missing_column_error() {
        let table = load_table_from_bytes("payments", b"a,b\n1,2\n").unwrap();
        let err = table.require_column("pay_month").unwrap_err();
        assert!(matches!(err, KpiError::MissingColumn { ref column, .. } if column == "pay_month"));
    }

    #[test]
    fn test_empty_source_rejected() {
        assert!(load_table_from_bytes("contracts", b"").is_err());
    }
}
