//! Infrastructure layer: storage backends and configuration.

pub mod config;
pub mod memory;
pub mod postgres;
pub mod stores;


pub use config::{AppConfig, ConfigError, StorageConfig};
pub use memory::InMemoryDatabase;
pub use postgres::PostgresDatabase;
pub use stores::Stores;
