//! Task lifecycle management.
//!
//! Tasks move through Pending, Inbox, Staging, Active, and Archived, gated
//! by a dependency graph that must stay acyclic. The module follows
//! hexagonal architecture:
//!
//! - Domain types and graph rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Short-ID addressing in [`resolver`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod resolver;
pub mod services;

#[cfg(test)]
mod tests;
