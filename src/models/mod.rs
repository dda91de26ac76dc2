pub mod file_report;
pub mod pattern;
pub mod project_report;
