pub mod blocks;
pub mod complexity;
pub mod debt;
pub mod enrichment;
pub mod language;
pub mod metrics;
pub mod registry;
pub mod scanner;
