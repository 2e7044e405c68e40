use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_yml::Value;
use yaml_merge_keys::merge_keys_serde_yml;

use crate::core::logging::DEFAULT_LOG_FILTER;
use crate::transport::{DEFAULT_QUEUE_DEPTH, TopicPath};

/// Dashboard settings read from YAML. Every field is optional; `<<` merge
/// keys may be used to share blocks between documents.
///
/// ```yaml
/// base: &base
///   tick_period_ms: 10
/// <<: *base
/// root: /SmartDashboard
/// preferences_path: ./preferences.json
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub root: String,
    pub tick_period_ms: u64,
    pub preferences_path: Option<PathBuf>,
    pub log_filter: String,
    pub queue_depth: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            tick_period_ms: 20,
            preferences_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let source = fs::read_to_string(path).map_err(|err| {
            format!("failed to read config '{}': {}", path.display(), err)
        })?;

        Self::parse(&source).map_err(|err| {
            format!("failed to load config '{}': {}", path.display(), err)
        })
    }

    pub fn parse(source: &str) -> Result<Self, String> {
        let raw: Value = serde_yml::from_str(source)
            .map_err(|err| format!("invalid YAML: {}", err))?;

        if raw.is_null() {
            return Ok(Self::default());
        }

        let merged = merge_keys_serde_yml(raw)
            .map_err(|err| format!("failed to process merge keys: {}", err))?;

        let mut config: Self = serde_yml::from_value(merged)
            .map_err(|err| format!("failed to decode config: {}", err))?;

        if config.queue_depth == 0 {
            return Err("queue_depth must be at least 1".to_string());
        }
        if config.tick_period_ms == 0 {
            return Err("tick_period_ms must be at least 1".to_string());
        }
        if config.root.len() > 1 {
            config.root = config.root.trim_end_matches('/').to_string();
            if config.root.is_empty() {
                config.root = "/".to_string();
            }
        }

        Ok(config)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn root_path(&self) -> TopicPath {
        TopicPath::new(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DashboardConfig::parse("").expect("parse empty");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.tick_period(), Duration::from_millis(20));
        assert_eq!(config.log_filter, "dashbind=info");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = DashboardConfig::parse("root: /SmartDashboard/\n")
            .expect("parse root");
        assert_eq!(config.root, "/SmartDashboard");
        assert_eq!(config.root_path().as_str(), "/SmartDashboard");
        assert_eq!(config.queue_depth, 20);
        assert_eq!(config.preferences_path, None);
    }

    #[test]
    fn slash_root_keeps_leading_separator() {
        let config = DashboardConfig::parse("root: /\n").expect("parse root");
        assert_eq!(config.root, "/");
        assert_eq!(config.root_path().join("Tab").as_str(), "/Tab");

        let config = DashboardConfig::parse("root: //\n").expect("parse root");
        assert_eq!(config.root, "/");
    }

    #[test]
    fn merge_keys_are_expanded() {
        let yaml = r#"
shared: &shared
  tick_period_ms: 10
  queue_depth: 5
<<: *shared
root: /Dashboard
"#;
        let config = DashboardConfig::parse(yaml).expect("parse merged");
        assert_eq!(config.tick_period_ms, 10);
        assert_eq!(config.queue_depth, 5);
        assert_eq!(config.root, "/Dashboard");
    }

    #[test]
    fn rejects_zero_queue_depth() {
        let err = DashboardConfig::parse("queue_depth: 0")
            .expect_err("zero depth should fail");
        assert!(err.contains("queue_depth"));
    }

    #[test]
    #[serial]
    fn load_reports_path_on_failure() {
        let path = env::temp_dir().join("dashbind-config-missing.yaml");
        let _ = fs::remove_file(&path);

        let err = DashboardConfig::load(&path).expect_err("missing file");
        assert!(err.contains("dashbind-config-missing.yaml"));
    }

    #[test]
    #[serial]
    fn load_reads_file() {
        let path = env::temp_dir().join("dashbind-config-load.yaml");
        fs::write(&path, "tick_period_ms: 50\nlog_filter: dashbind=debug\n")
            .expect("write config");

        let config = DashboardConfig::load(&path).expect("load config");
        assert_eq!(config.tick_period(), Duration::from_millis(50));
        assert_eq!(config.log_filter, "dashbind=debug");

        let _ = fs::remove_file(&path);
    }
}
