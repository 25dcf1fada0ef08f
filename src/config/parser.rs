use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;
use toml::Table;

impl Config {
    /// Constructs a configuration from raw key/value input
    ///
    /// An absent or empty table produces [`Config::default`]. A non-empty
    /// table must carry all five required keys, each coercible to its
    /// declared type.
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingField` - a required key is absent
    /// * `ConfigError::InvalidValue` - a value cannot be coerced
    ///
    /// # Example
    ///
    /// ```
    /// use sitegraph::Config;
    ///
    /// let raw: toml::Table = toml::from_str(r#"
    /// TargetURL = "https://example.com/"
    /// CrawlDepth = 5
    /// PageNumberLimit = "8"
    /// UserAgent = "Mozilla/5.0"
    /// RequestDelay = 250
    /// "#).unwrap();
    ///
    /// let config = Config::from_raw(Some(&raw)).unwrap();
    /// assert_eq!(config.page_number_limit, 8);
    /// ```
    pub fn from_raw(raw: Option<&Table>) -> ConfigResult<Self> {
        match raw {
            None => Ok(Self::default()),
            Some(table) if table.is_empty() => Ok(Self::default()),
            Some(table) => validate(table),
        }
    }
}

/// Parses a configuration from an in-memory TOML document
///
/// # Arguments
///
/// * `content` - TOML text with top-level `TargetURL`, `CrawlDepth`, ... keys
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed and validated configuration
/// * `Err(ConfigError)` - Malformed TOML, or a missing or invalid field
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let table: Table = toml::from_str(content)?;
    Config::from_raw(Some(&table))
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitegraph::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Seed: {}", config.target_url);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let table = load_raw_config(path)?;
    Config::from_raw(Some(&table))
}

/// Reads a configuration file into its raw table without validating it
///
/// Callers that merge overrides (such as command-line flags) into the file's
/// keys start here and finish with [`Config::from_raw`].
pub fn load_raw_config(path: &Path) -> ConfigResult<Table> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
