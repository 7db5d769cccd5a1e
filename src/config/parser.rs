use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML configuration at `path`
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// SHA-256 of the raw configuration file, hex encoded
///
/// Stored with every crawl run so runs with different seeds or limits can be told apart.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let raw = std::fs::read_to_string(path)?;
    Ok(hash_content(&raw))
}

/// Loads a configuration together with the hash of the exact bytes it was parsed from
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    Ok((config, hash_content(&raw)))
}

/// Parses and validates configuration text
pub fn parse_config(raw: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(raw)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
seed-domains = ["dcinside.com", "fmkorea.com"]
seed-keywords = ["프리섭", "첫충"]
max-crawl-cycles = 50
search-delay-ms = 0
max-concurrency = 4

[fetch]
timeout-ms = 10000

[classifier]
gambling-indicators = ["카지노", "casino"]
chat-invite-hosts = ["open.kakao.com", "*.discord.com"]

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.seed_domains.len(), 2);
        assert_eq!(config.crawler.seed_keywords, vec!["프리섭", "첫충"]);
        assert_eq!(config.crawler.max_crawl_cycles, 50);
        assert_eq!(config.crawler.search_delay_ms, 0);
        assert_eq!(config.crawler.batch_delay_ms, 500);
        assert_eq!(config.crawler.max_concurrency, 4);
        assert_eq!(config.crawler.max_domain_retries, 3);
        assert_eq!(config.fetch.timeout_ms, 10000);
        assert_eq!(config.fetch.retry_limit, 2);
        assert_eq!(config.classifier.gambling_indicators.len(), 2);
        assert_eq!(config.output.summary_path, "./targets.md");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/siteseeker.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
seed-domains = ["dcinside.com"]
seed-keywords = ["프리섭"]
max-concurrency = 0

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_hash_matches_loaded_content() {
        let content = r#"
[crawler]
seed-domains = ["dcinside.com"]
seed-keywords = ["x"]

[output]
database-path = "./test.db"
"#;
        let file = create_temp_config(content);

        let (_, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
        assert_eq!(hash.len(), 64);

        let other = create_temp_config(&content.replace("\"x\"", "\"y\""));
        assert_ne!(hash, compute_config_hash(other.path()).unwrap());
    }

    #[test]
    fn test_parse_config_rejects_missing_output() {
        let result = parse_config("[crawler]\nseed-domains = [\"a.com\"]\nseed-keywords = [\"b\"]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
