//! Configuration management for automessages
//!
//! The configuration file is TOML. Every top-level table is one broadcast
//! group:
//!
//! ```toml
//! [lobby]
//! servers = ["lobby{1-3}"]
//! interval = 60
//! random = false
//! messages = ["&aWelcome %player%!"]
//! ```
//!
//! Sections are deserialized one at a time so a malformed group does not
//! prevent the others from loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::broadcast::{is_global, RangeError, ServerRange};

/// Configuration written on first load when the file does not exist
pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or bootstrapping the file failed
    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// One group section has the wrong shape
    #[error("Invalid section '{name}': {reason}")]
    InvalidSection { name: String, reason: String },
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One broadcast group section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Server names, `name{low-high}` ranges, or `global`
    pub servers: Vec<String>,

    /// Seconds between messages
    pub interval: i64,

    /// Shuffle the messages once per cycle
    pub random: bool,

    /// Message templates
    pub messages: Vec<String>,
}

impl GroupConfig {
    /// Interval as a duration, `None` when not positive
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        u64::try_from(self.interval)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Check every range entry can be expanded
    ///
    /// Ranges are ignored when the group targets `global`.
    pub fn check_ranges(&self) -> Result<(), RangeError> {
        if is_global(self.servers.as_slice()) {
            return Ok(());
        }
        self.servers
            .iter()
            .filter_map(|entry| ServerRange::parse(entry))
            .try_for_each(|range| range.map(drop))
    }
}

/// Parsed configuration file
#[derive(Debug, Default)]
pub struct AutoMessagesConfig {
    groups: Vec<(String, GroupConfig)>,
    invalid: Vec<ConfigError>,
}

impl AutoMessagesConfig {
    /// Valid group sections in file order
    pub fn groups(&self) -> &[(String, GroupConfig)] {
        &self.groups
    }

    /// Look a group section up by name
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, config)| config)
    }

    /// Sections that failed to deserialize
    pub fn invalid(&self) -> &[ConfigError] {
        &self.invalid
    }

    /// Number of sections in the file, valid or not
    pub fn len(&self) -> usize {
        self.groups.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromStr for AutoMessagesConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let table: toml::Table = toml::from_str(content)?;
        let mut config = Self::default();

        for (name, value) in table {
            if !value.is_table() {
                config.invalid.push(ConfigError::InvalidSection {
                    name,
                    reason: format!("expected a table, found {}", value.type_str()),
                });
                continue;
            }

            let checked = value
                .try_into::<GroupConfig>()
                .map_err(|e| e.message().to_string())
                .and_then(|group| {
                    group.check_ranges().map_err(|e| e.to_string())?;
                    Ok(group)
                });

            match checked {
                Ok(group) => config.groups.push((name, group)),
                Err(reason) => config
                    .invalid
                    .push(ConfigError::InvalidSection { name, reason }),
            }
        }

        Ok(config)
    }
}

/// Write the bundled default configuration to `path`
///
/// Returns `false` without touching anything when the file already exists.
pub fn bootstrap(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(|e| ConfigError::io(path, e))?;

    tracing::info!(path = %path.display(), "Created default config");
    Ok(true)
}

/// Load the configuration, creating the default file first if missing
pub fn load(path: &Path) -> Result<AutoMessagesConfig, ConfigError> {
    bootstrap(path)?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let config: AutoMessagesConfig = content.parse()?;

    tracing::debug!(
        path = %path.display(),
        groups = config.groups.len(),
        invalid = config.invalid.len(),
        "Parsed config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: AutoMessagesConfig = DEFAULT_CONFIG.parse().unwrap();
        assert!(config.invalid().is_empty());
        assert_eq!(config.len(), 2);

        let names: Vec<_> = config.groups().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["lobby", "global"]);

        let lobby = config.group("lobby").unwrap();
        assert_eq!(lobby.interval(), Some(Duration::from_secs(60)));
        assert!(!lobby.random);
        assert_eq!(lobby.messages.len(), 3);
    }

    #[test]
    fn test_missing_keys_default() {
        let config: AutoMessagesConfig = "[bare]\n".parse().unwrap();
        let bare = config.group("bare").unwrap();
        assert_eq!(bare, &GroupConfig::default());
        assert_eq!(bare.interval(), None);
    }

    #[test]
    fn test_non_positive_interval() {
        let mut group = GroupConfig {
            interval: -10,
            ..Default::default()
        };
        assert_eq!(group.interval(), None);
        group.interval = 0;
        assert_eq!(group.interval(), None);
    }

    #[test]
    fn test_invalid_section_does_not_hide_others() {
        let content = r#"
stray = 5

[broken]
interval = "soon"

[ok]
servers = ["global"]
interval = 10
messages = ["hi"]
"#;
        let config: AutoMessagesConfig = content.parse().unwrap();
        assert_eq!(config.groups().len(), 1);
        assert_eq!(config.len(), 3);

        let names: Vec<_> = config
            .invalid()
            .iter()
            .filter_map(|e| match e {
                ConfigError::InvalidSection { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["stray", "broken"]);
    }

    #[test]
    fn test_oversized_range_invalidates_section() {
        let content = r#"
[huge]
servers = ["lobby{0-4000000000}"]
interval = 10
messages = ["x"]

[wide]
servers = ["lobby{1-20000}", "hub"]
interval = 10
messages = ["x"]

[everyone]
servers = ["lobby{0-4000000000}", "global"]
interval = 10
messages = ["x"]
"#;
        let config: AutoMessagesConfig = content.parse().unwrap();
        assert!(config.group("huge").is_none());
        assert!(config.group("wide").is_none());
        assert!(config.group("everyone").is_some());

        let reasons: Vec<_> = config.invalid().iter().map(|e| e.to_string()).collect();
        assert!(reasons[0].contains("'huge'"));
        assert!(reasons[0].contains("larger than 2147483647"));
        assert!(reasons[1].contains("spans 20000 servers"));
    }

    #[test]
    fn test_malformed_toml() {
        let result: Result<AutoMessagesConfig, _> = "[unclosed".parse();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_file() {
        let config: AutoMessagesConfig = "".parse().unwrap();
        assert!(config.is_empty());
    }
}
