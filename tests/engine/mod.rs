//! Engine integration test modules

pub mod configuration;
pub mod scenarios;
