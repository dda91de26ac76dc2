pub mod file;
pub mod input;
pub mod project;
pub mod settings;
