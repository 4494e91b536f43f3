//! Configuration for grc-workflowd

use grc_workflow_engine::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Workflow template definitions (TOML)
    #[serde(default = "default_templates_path")]
    pub templates_path: PathBuf,

    /// Departments, managers and roles (TOML); empty directory when unset
    #[serde(default)]
    pub directory_path: Option<PathBuf>,

    /// Store snapshot written after every sweep
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Append-only history trail (JSON Lines)
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Sweep intervals
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            templates_path: default_templates_path(),
            directory_path: None,
            state_path: default_state_path(),
            history_path: default_history_path(),
            scheduler: SchedulerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_templates_path() -> PathBuf {
    PathBuf::from("config/templates.toml")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/workflow-state.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/workflow-history.jsonl")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Environment variables with GRC_ prefix; nested keys use a double underscore
        builder = builder.add_source(
            config::Environment::with_prefix("GRC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.templates_path, PathBuf::from("config/templates.toml"));
        assert!(config.directory_path.is_none());
        assert_eq!(config.scheduler.escalation_interval_secs, 3600);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = DaemonConfig::load(None).unwrap();
        assert_eq!(config.history_path, PathBuf::from("data/workflow-history.jsonl"));
        assert_eq!(config.scheduler.escalation_notice_interval_secs, 14400);
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            templates_path = "/etc/grc/templates.toml"
            directory_path = "/etc/grc/directory.toml"

            [scheduler]
            escalation_interval_secs = 60

            [logging]
            json = true
            "#
        )
        .unwrap();

        let config = DaemonConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.templates_path, PathBuf::from("/etc/grc/templates.toml"));
        assert_eq!(
            config.directory_path,
            Some(PathBuf::from("/etc/grc/directory.toml"))
        );
        assert_eq!(config.scheduler.escalation_interval_secs, 60);
        assert_eq!(config.scheduler.task_overdue_interval_secs, 3600);
        assert!(config.logging.json);
        assert_eq!(config.state_path, PathBuf::from("data/workflow-state.json"));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = DaemonConfig::load(Some("/nonexistent/grc-workflowd.toml")).unwrap();
        assert_eq!(config.templates_path, PathBuf::from("config/templates.toml"));
    }
}
