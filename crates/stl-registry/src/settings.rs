//! # Registry Settings
//!
//! Deployment settings, read from a YAML file and overridden by the
//! environment:
//!
//! ```yaml
//! reveal_window_hours: 24
//! content_root: /var/lib/stl/evidence
//! poll_interval_ms: 2000
//! max_polls: 90
//! ```
//!
//! | Variable | Field |
//! |----------|-------|
//! | `STL_REVEAL_HOURS` | `reveal_window_hours` |
//! | `STL_CONTENT_ROOT` | `content_root` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stl_ledger::PollPolicy;
use stl_state::RevealWindow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidOverride {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    #[serde(rename = "reveal_window_hours")]
    pub reveal_window: RevealWindow,
    /// Directory for the filesystem evidence store.
    pub content_root: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        let poll = PollPolicy::default();
        Self {
            reveal_window: RevealWindow::default(),
            content_root: None,
            poll_interval_ms: u64::try_from(poll.interval.as_millis()).unwrap_or(u64::MAX),
            max_polls: poll.max_polls,
        }
    }
}

impl RegistrySettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()
    }

    /// Reject values that would make every write report a timeout.
    fn validate(self) -> Result<Self, SettingsError> {
        if self.max_polls == 0 {
            return Err(SettingsError::Invalid {
                field: "max_polls",
                reason: "must poll at least once".into(),
            });
        }
        Ok(self)
    }

    /// Read `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let base = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| SettingsError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&text)?
            }
            None => Self::default(),
        };
        base.with_overrides(|k| std::env::var(k).ok())
    }

    /// Apply `STL_REVEAL_HOURS` and `STL_CONTENT_ROOT` from `get`.
    pub fn with_overrides(
        mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        if let Some(raw) = get("STL_REVEAL_HOURS") {
            let hours: u32 = raw.trim().parse().map_err(|_| SettingsError::InvalidOverride {
                var: "STL_REVEAL_HOURS",
                value: raw.clone(),
                reason: "not a whole number of hours".into(),
            })?;
            self.reveal_window =
                RevealWindow::hours(hours).map_err(|e| SettingsError::InvalidOverride {
                    var: "STL_REVEAL_HOURS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(root) = get("STL_CONTENT_ROOT").filter(|r| !r.is_empty()) {
            self.content_root = Some(PathBuf::from(root));
        }
        Ok(self)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let s = RegistrySettings::from_yaml_str("").unwrap();
        assert_eq!(s.reveal_window.as_hours(), 24);
        assert!(s.content_root.is_none());
        assert_eq!(s.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn yaml_fields() {
        let s = RegistrySettings::from_yaml_str(
            "reveal_window_hours: 48\ncontent_root: /tmp/evidence\nmax_polls: 5\n",
        )
        .unwrap();
        assert_eq!(s.reveal_window.as_hours(), 48);
        assert_eq!(s.content_root, Some(PathBuf::from("/tmp/evidence")));
        assert_eq!(s.max_polls, 5);
        assert_eq!(s.poll_interval_ms, 2000);
    }

    #[test]
    fn zero_hour_window_rejected() {
        assert!(RegistrySettings::from_yaml_str("reveal_window_hours: 0").is_err());
    }

    #[test]
    fn oversized_window_rejected() {
        assert!(RegistrySettings::from_yaml_str("reveal_window_hours: 4294967295").is_err());
        assert!(RegistrySettings::from_yaml_str("reveal_window_hours: 8760").is_ok());
        let err = RegistrySettings::default()
            .with_overrides(|k| (k == "STL_REVEAL_HOURS").then(|| "4294967295".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidOverride { var: "STL_REVEAL_HOURS", .. }
        ));
    }

    #[test]
    fn zero_polls_rejected() {
        let err = RegistrySettings::from_yaml_str("max_polls: 0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_polls", .. }));
        assert!(RegistrySettings::from_yaml_str("max_polls: 1").is_ok());
    }

    #[test]
    fn env_overrides_file() {
        let s = RegistrySettings::from_yaml_str("reveal_window_hours: 48")
            .unwrap()
            .with_overrides(|k| match k {
                "STL_REVEAL_HOURS" => Some("6".into()),
                "STL_CONTENT_ROOT" => Some("/data".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(s.reveal_window.as_hours(), 6);
        assert_eq!(s.content_root, Some(PathBuf::from("/data")));
    }

    #[test]
    fn bad_override_names_variable() {
        let err = RegistrySettings::default()
            .with_overrides(|k| (k == "STL_REVEAL_HOURS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("STL_REVEAL_HOURS"));
        assert!(RegistrySettings::default().with_overrides(none).is_ok());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stl.yaml");
        std::fs::write(&path, "reveal_window_hours: 12\n").unwrap();
        let s = RegistrySettings::from_yaml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(s.reveal_window.as_hours(), 12);
        assert!(matches!(
            RegistrySettings::load(Some(&dir.path().join("missing.yaml"))),
            Err(SettingsError::Io { .. })
        ));
    }
}
