//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for alarm configs.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Repository APIs return explicit outcomes: rows, `NotFound`, or a
//!   store/validation error. Sentinel conversion happens in the service layer.

pub mod alarm_config_repo;
