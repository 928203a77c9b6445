//! Sales domain module: the sale aggregate (header + owned lines) and the
//! service that creates, patches and deletes it.
//!
//! Lines freeze the unit price given at transaction time. The sale total is
//! always derived from the lines and never stored.

pub mod sale;
pub mod service;
pub mod store;

pub use sale::{NewSale, NewSaleLine, SaleHeader, SaleLine, SalePatch, validate_lines};
pub use service::SaleService;
pub use store::SaleStore;
