use simavi::infrastructure::observability::TracingConfig;
use simavi::presentation::Environment;

#[test]
fn given_prod_with_json_when_creating_config_then_fields_are_kept() {
    let config = TracingConfig::new(Environment::Prod, true);

    assert_eq!(config.environment, Environment::Prod);
    assert!(config.json_format);
}

#[test]
fn given_environment_names_when_parsing_then_aliases_are_accepted() {
    assert_eq!(
        Environment::try_from("LOCAL".to_string()),
        Ok(Environment::Local)
    );
    assert_eq!(
        Environment::try_from("production".to_string()),
        Ok(Environment::Prod)
    );
    assert!(Environment::try_from("staging".to_string()).is_err());
}

#[test]
fn given_environments_when_checking_cookie_security_then_only_prod_is_secure() {
    assert!(Environment::Prod.secure_cookies());
    assert!(!Environment::Local.secure_cookies());
    assert!(!Environment::Test.secure_cookies());
}

#[test]
fn given_prod_when_choosing_default_filter_then_debug_logs_are_off() {
    let prod = TracingConfig::new(Environment::Prod, true);
    let local = TracingConfig::new(Environment::Local, false);

    assert!(!prod.default_filter().contains("debug"));
    assert!(local.default_filter().contains("simavi=debug"));
}
