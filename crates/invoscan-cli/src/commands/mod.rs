//! CLI command implementations.

pub mod parse;
pub mod run;
pub mod scan;
