//! Siteseeker: a frontier-expanding hunter for illicit-service websites
//!
//! This crate searches community sites for keyword hits, explores the pages it
//! finds, classifies linked sites (gambling, pirated game servers, ad hosts,
//! chat invites) and feeds what it learns back into its own search frontier.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod fetch;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Siteseeker operations
#[derive(Debug, Error)]
pub enum SeekerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Siteseeker operations
pub type Result<T> = std::result::Result<T, SeekerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{Classification, KeywordClassifier, LinkType, ResultClassifier, SiteType};
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport, Scheduler};
pub use fetch::{CrawlTask, ExtractionHint, FetchOutcome, PageFetcher};
pub use state::{Frontier, FrontierGuard};
pub use url::{leading_label, normalize_domain};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_storage_errors_convert_with_question_mark() {
        fn load() -> Result<()> {
            let found: std::result::Result<(), StorageError> = Err(StorageError::Poisoned);
            found?;
            Ok(())
        }

        let err = load().unwrap_err();
        assert!(matches!(err, SeekerError::Storage(StorageError::Poisoned)));
        assert_eq!(err.to_string(), "Storage error: Storage lock poisoned");
    }
}
