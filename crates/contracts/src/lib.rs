//! Typed bindings for the DAO governance token and timelock
//!
//! Each contract declares its interface once as a static descriptor set in
//! `dao-binding` terms; the callable surface here is the mechanical expansion
//! of that declaration: one wrapper per function, one typed record plus
//! receipt/log/filter/stream accessors per event. Nothing in this crate talks
//! to the chain directly; everything delegates to the generic binding.

mod macros;

pub mod governance_token;
pub mod timelock;

pub use governance_token::GovernanceToken;
pub use timelock::Timelock;
