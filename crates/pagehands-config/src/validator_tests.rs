    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.router.request_timeout_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "router.request_timeout_ms"));
    }

    #[test]
    fn test_validate_long_timeout_warning() {
        let mut config = Config::default();
        config.router.request_timeout_ms = 3_600_000;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_validate_zero_message_limit() {
        let mut config = Config::default();
        config.router.max_message_bytes = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "router.max_message_bytes"));
    }

    #[test]
    fn test_validate_class_name_with_space() {
        let mut config = Config::default();
        config.highlight.class_name = "two classes".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_empty_colour() {
        let mut config = Config::default();
        config.highlight.background_color = " ".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "highlight.backgroundColor"));
    }

    #[test]
    fn test_validate_opacity_out_of_range() {
        let mut config = Config::default();
        config.settings.toolbar_opacity = 1.5;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_unknown_toolbar_position() {
        let mut config = Config::default();
        config.settings.toolbar_position = "middle".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "settings.toolbarPosition"));
    }

    #[test]
    fn test_validate_log_directive_warning() {
        let mut config = Config::default();
        config.logging.level = "pagehands_core=debug".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
