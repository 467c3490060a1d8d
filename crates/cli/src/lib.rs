//! Command-line interface for the Firple font generator.

pub mod cli;
