//! CSV codec and the table-backed record store.

mod csv_parser;
mod csv_writer;
mod record_store;

pub use csv_parser::CsvParser;
pub use record_store::{CsvRecordStore, RecordStore, Snapshot, StoreReceipt};
