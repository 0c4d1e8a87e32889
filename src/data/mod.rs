//! Contract and payment records: raw loading and normalization

mod records;
pub mod loader;
pub mod normalize;

pub use records::{Contract, ContractSet, ContractType, Payment, PaymentSet};
pub use loader::{load_table_from_bytes, load_table_from_reader, RawTable};
pub use normalize::{normalize_contracts, normalize_payments};

#[cfg(test)]
pub(crate) use records::fixtures;
