//! The `bulkstep` binary: loads CSV tables, runs a stock vertex program and
//! writes its output tables.

pub mod cli;
pub mod config;
pub mod error;
pub mod run;
