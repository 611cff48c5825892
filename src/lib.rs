//! A purchase order approval workflow over a small stock inventory.
//!
//! Sales representatives draft orders against current stock, store keepers
//! approve or reject them, and approval settles the stock decrements and
//! the status flip as one atomic sled transaction.

pub mod error;
pub mod order;
pub mod role;
pub mod service;
pub mod stock;
pub mod store;
pub mod utils;
