pub mod db;
pub mod domain;
pub mod error;

pub use db::{CsvDataStore, DataStore};
pub use error::StoreError;
