//! Command-line front end: loads a country, runs the engine, writes CSV.

pub mod loader;
pub mod report;
