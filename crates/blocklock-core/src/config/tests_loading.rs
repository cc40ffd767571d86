//! Loading-focused tests for configuration

#[cfg(test)]
mod loading_tests {
    use std::collections::HashMap;

    use crate::config::{load_config_in, load_toml_file, project_config_path, Config};
    use crate::{Error, Result};

    fn write_project_config(root: &std::path::Path, body: &str) -> Result<()> {
        let path = project_config_path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, body)?;
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[coordinator]\nretry_backoff_ms = 25\n")?;

        let config = load_toml_file(&path)?;
        assert_eq!(config.coordinator.retry_backoff_ms, 25);
        assert_eq!(config.database, Config::default().database);
        assert_eq!(config.broadcast, Config::default().broadcast);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "database = \n invalid toml [[[")?;

        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::ParseError(_))));
        Ok(())
    }

    #[test]
    fn test_directory_is_not_a_config_file() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let result = load_toml_file(temp_dir.path());
        assert!(matches!(result, Err(Error::IoError(_))));
        Ok(())
    }

    #[test]
    fn test_project_file_overrides_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        write_project_config(
            temp_dir.path(),
            "database = \"locks.db\"\n[broadcast]\nroom_capacity = 8\n",
        )?;

        let config = load_config_in(temp_dir.path())?;
        assert_eq!(config.database, "locks.db");
        assert_eq!(config.broadcast.room_capacity, 8);
        Ok(())
    }

    #[test]
    fn test_project_file_failing_validation_is_rejected() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        write_project_config(temp_dir.path(), "[coordinator]\nretry_backoff_ms = 0\n")?;

        let result = load_config_in(temp_dir.path());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        Ok(())
    }

    #[test]
    fn test_env_overrides_file_values() -> Result<()> {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BLOCKLOCK_DATABASE", "/tmp/env.db"),
            ("BLOCKLOCK_RETRY_BACKOFF_MS", " 12 "),
        ]);
        let config = Config::default()
            .apply_env_with(|key| vars.get(key).map(|v| (*v).to_string()))?;

        assert_eq!(config.database, "/tmp/env.db");
        assert_eq!(config.coordinator.retry_backoff_ms, 12);
        assert_eq!(config.log_level, "info");
        Ok(())
    }

    #[test]
    fn test_invalid_env_number_is_rejected() {
        let result = Config::default().apply_env_with(|key| {
            (key == "BLOCKLOCK_ROOM_CAPACITY").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_merge_keeps_lower_layer_when_upper_is_default() {
        let global = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        let project = Config {
            database: "project.db".to_string(),
            ..Config::default()
        };

        let merged = global.merge(project);
        assert_eq!(merged.log_level, "debug");
        assert_eq!(merged.database, "project.db");
    }
}
