pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod holiday;
pub mod io;
pub mod paths;
pub mod record;
pub mod reorder;
pub mod session;
pub mod sla;
pub mod store;
pub mod transfer;
pub mod types;

pub use error::{ProcError, Result};
