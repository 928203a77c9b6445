//! In-memory storage for dev/tests.

pub mod database;
pub mod table;

pub use database::InMemoryDatabase;
pub use table::Table;
