//! Chip2Chip job wrapper
//!
//! Turns hosted-job parameters into a parameter file for the Chip2Chip gene
//! set conversion tool, runs the tool, and gathers its report.

pub mod cli;
pub mod core;
pub mod fs;
pub mod logging;
