// Internal modules
#[macro_use]
pub mod logging;
pub mod cfgfile;
pub mod classification;
pub mod config;
pub mod config_data;
pub mod file_processor;
pub mod grammar;
pub mod model;
pub mod pipeline;
pub mod resolution;
pub mod utils;

// Re-export key types for library consumers
pub use model::{Station, Subsystem};
pub use pipeline::{parse_lines, parse_str, process_file, HwConfig, PipelineError};
pub use resolution::{Diagnostic, Resolution, ResolutionError, SectionFormatError};
