//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use crate::config::Config;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_database_rejected() {
        let config = Config {
            database: "  ".to_string(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("database"));
        }
    }

    #[test]
    fn test_zero_room_capacity_rejected() {
        let mut config = Config::default();
        config.broadcast.room_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retry_backoff_rejected() {
        let mut config = Config::default();
        config.coordinator.retry_backoff_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.code(), "INVALID_CONFIG");
        }
    }

    #[test]
    fn test_oversized_retry_backoff_rejected() {
        let mut config = Config::default();
        config.coordinator.retry_backoff_ms = 60_000;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("retry_backoff_ms"));
        }
    }

    #[test]
    fn test_coordinator_settings_follow_config() {
        let mut config = Config::default();
        config.coordinator.retry_backoff_ms = 40;
        assert_eq!(
            config.coordinator_settings().retry_backoff,
            std::time::Duration::from_millis(40)
        );
    }
}
