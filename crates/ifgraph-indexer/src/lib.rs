//! Source analysis: parsing, declaration scanning, reference extraction
//! and request coordination

pub mod config;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod languages;
pub mod parser;
pub mod scanner;


pub use config::{AnalyzerConfig, ConfigError, DEFAULT_IGNORE_LIST};
pub use coordinator::{Analysis, Coordinator, DependencyViews};
pub use error::{AnalysisError, ErrorKind};
pub use extractor::{ExtractionStats, extract_references};
pub use languages::DeclarationLanguage;
pub use parser::{Dialect, parse_source};
pub use scanner::scan_declarations;
