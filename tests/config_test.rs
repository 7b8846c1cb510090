use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use ccstats::config::Config;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        // Test logging defaults
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        // Test path defaults
        assert_eq!(config.paths.claude_home, None);
        assert_eq!(config.paths.log_directory, PathBuf::from("logs"));

        // Test report defaults
        assert_eq!(config.report.project_limit, 10);
        assert_eq!(config.report.tool_limit, 10);
        assert_eq!(config.report.daily_days, 30);
        assert_eq!(config.report.events_minutes, 60);
        assert_eq!(config.report.events_limit, 200);
    }

    #[test]
    fn test_env_variable_override() {
        env::set_var("CCSTATS_PROJECT_LIMIT", "5");
        env::set_var("CCSTATS_TOOL_LIMIT", "3");
        env::set_var("CCSTATS_DAILY_DAYS", "7");
        env::set_var("CLAUDE_HOME", "/data/claude");

        let mut config = Config::default();
        config
            .apply_env_overrides()
            .expect("Failed to apply env overrides");

        assert_eq!(config.report.project_limit, 5);
        assert_eq!(config.report.tool_limit, 3);
        assert_eq!(config.report.daily_days, 7);
        assert_eq!(config.claude_home().unwrap(), PathBuf::from("/data/claude"));
        assert_eq!(
            config.hooks_dir().unwrap(),
            PathBuf::from("/data/claude").join("hooks")
        );

        // Invalid numbers are rejected
        env::set_var("CCSTATS_PROJECT_LIMIT", "many");
        let mut config = Config::default();
        assert!(config.apply_env_overrides().is_err());

        // Cleanup
        env::remove_var("CCSTATS_PROJECT_LIMIT");
        env::remove_var("CCSTATS_TOOL_LIMIT");
        env::remove_var("CCSTATS_DAILY_DAYS");
        env::remove_var("CLAUDE_HOME");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Test valid config
        assert!(config.validate().is_ok());

        // Test invalid log format
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        // Reset and test invalid log output
        config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());

        // Reset and test daily window bounds
        config = Config::default();
        config.report.daily_days = 0;
        assert!(config.validate().is_err());
        config.report.daily_days = 366;
        assert!(config.validate().is_err());
        config.report.daily_days = 365;
        assert!(config.validate().is_ok());

        // Reset and test events bounds
        config = Config::default();
        config.report.events_minutes = 0;
        assert!(config.validate().is_err());
        config = Config::default();
        config.report.events_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ccstats.toml");

        let config_content = r#"
[logging]
level = "debug"
format = "json"
output = "file"

[paths]
claude_home = "/srv/claude"
log_directory = "/var/log/ccstats"

[report]
project_limit = 25
"#;

        fs::write(&config_path, config_content).expect("Failed to write config file");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.output, "file");
        assert_eq!(config.paths.claude_home, Some(PathBuf::from("/srv/claude")));
        assert_eq!(
            config.paths.log_directory,
            PathBuf::from("/var/log/ccstats")
        );
        assert_eq!(config.report.project_limit, 25);
        // Unspecified values keep their defaults
        assert_eq!(config.report.tool_limit, 10);
        assert_eq!(config.report.daily_days, 30);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ccstats.toml");
        fs::write(&config_path, "[report\nproject_limit = ").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("saved.toml");

        let mut config = Config::default();
        config.report.tool_limit = 4;
        config.save_to_file(&config_path).expect("Failed to save config");

        let loaded = Config::load_from_file(&config_path).expect("Failed to reload config");
        assert_eq!(loaded.report.tool_limit, 4);
        assert_eq!(loaded.logging.level, config.logging.level);
    }
}
