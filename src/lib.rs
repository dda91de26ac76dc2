pub mod analysis;
pub mod commands;
pub mod error;
pub mod models;

pub use analysis::complexity::{ComplexityProvider, HeuristicComplexity};
pub use analysis::enrichment::{Classification, EnrichmentProvider};
pub use analysis::registry::PatternRegistry;
pub use commands::file::FileAnalyzer;
pub use commands::input::SourceFile;
pub use commands::project::{aggregate, aggregate_with};
pub use commands::settings::{load_settings, AnalyzerSettings};
pub use error::{AnalysisError, EnrichmentError, Result};
pub use models::file_report::{FileOutcome, FileReport};
pub use models::project_report::ProjectReport;
