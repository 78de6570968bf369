pub mod store;

pub use store::{ITupleStore, ScanOrder, ScanQuery, TimeBound};
