pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod lookup;
pub mod output;
pub mod parser;
pub mod stats;
