//! Tasker: task lifecycle orchestration with short-ID addressing.
//!
//! This crate tracks work items through ordered stages, maintains an
//! acyclic dependency graph between them, restructures that graph (merge,
//! split, fan-out, fan-in), and resolves partial task and user identifiers
//! for CLI and RPC front ends.
//!
//! # Architecture
//!
//! Tasker follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports (in-memory stores)
//!
//! # Modules
//!
//! - [`task`]: Task stages, dependency graph, lifecycle service, and
//!   identifier resolver
//! - [`user`]: Users, the directory resolver, and user registration
//! - [`resolution`]: Ambiguity reporting shared by both resolvers
//! - [`error`]: Transport-neutral error kinds
//! - [`config`]: Lifecycle configuration

pub mod config;
pub mod error;
pub mod resolution;
pub mod task;
pub mod user;
