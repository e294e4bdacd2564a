//! Business logic services module.

pub mod session;

pub use session::ContractSession;
