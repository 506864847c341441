//! Integration tests for error types

#[cfg(test)]
mod tests {
    use mlprobe_errors::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = SessionError::EmptyName.into();
        assert!(matches!(err, Error::Session(_)));
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::Timeout {
            command: "python3".into(),
            timeout_seconds: 30,
        };
        assert_eq!(err.to_string(), "command timed out after 30s: python3");
    }

    #[test]
    fn test_error_clone() {
        let err = HostError::DiscoveryFailed {
            exit_code: 1,
            output: "ModuleNotFoundError: No module named 'matlab'".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Table>("[verify\nmatch_mode = 1").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
        assert_eq!(err.user_code(), Some("config.parse_error"));
    }

    #[test]
    fn test_user_facing_delegation() {
        let err: Error = ConfigError::InvalidValue {
            field: "MLPROBE_MATCH_MODE".into(),
            value: "fuzzy".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("config.invalid_value"));
        assert!(err.user_hint().is_some());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err: Error = PlatformError::Timeout {
            command: "matlab".into(),
            timeout_seconds: 5,
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.user_code(), Some("platform.timeout"));
    }
}
