pub mod conversion;
pub mod rate_table;
