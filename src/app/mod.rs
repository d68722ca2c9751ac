//! Demo driver application

pub mod cli;
pub mod demo;
pub mod startup;
