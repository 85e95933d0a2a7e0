pub mod csv_store;
pub mod db;
pub mod error;
pub mod models;
pub mod parse;
pub mod store;

pub use rusqlite;
