//! Usage tracking: client registration, activity logging and admin stats,
//! persisted as two JSON collections.
//!
//! `contract` holds the transport-free models; [`UsageTracker`] wires storage,
//! the domain service and the REST routes together.

pub mod contract;
pub use contract::model;

pub mod module;
pub use module::UsageTracker;

// Layer internals, public for integration tests and the server binary.
#[doc(hidden)]
pub mod api;
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
