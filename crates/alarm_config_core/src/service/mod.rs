//! Core use-case services.
//!
//! # Responsibility
//! - Present the alarm config operations to API and scheduler callers.
//! - Keep callers decoupled from storage details and store failures.

pub mod alarm_config_service;
