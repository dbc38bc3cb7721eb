//! Domain model for alarm rule configuration.
//!
//! # Responsibility
//! - Define the typed row read back from `t_o_alarm_config`.
//! - Define the loosely typed write input accepted by create/update.
//!
//! # Invariants
//! - Deletion is represented by the `is_delete` tombstone, never a row removal.

pub mod alarm_config;
pub mod field_set;
