//! Output workbook: table layout and the tables of a finished run

mod assemble;
mod table;

pub use assemble::*;
pub use table::{Cell, SheetInfo, Table, Workbook};
