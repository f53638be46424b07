// Config persistence through an isolated TestContext.
use courier::config::{Config, DEFAULT_API_BASE_URL};
use courier::context::{AppContext, TestContext};
use courier::model::Bucket;

#[test]
fn test_missing_config_is_detected() {
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));

    let cfg = Config::load_or_default(&ctx).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.default_tab, Bucket::Today);
}

#[test]
fn test_save_then_load() {
    let ctx = TestContext::new();
    let cfg = Config {
        api_base_url: "http://127.0.0.1:8080/api".to_string(),
        default_tab: Bucket::Expired,
        log_level: "debug".to_string(),
        request_timeout_secs: 5,
        ..Config::default()
    };
    cfg.save(&ctx).unwrap();

    assert!(ctx.get_config_file_path().unwrap().exists());
    assert_eq!(Config::load(&ctx).unwrap(), cfg);
    assert_eq!(cfg.log_level_filter(), log::LevelFilter::Debug);
}

#[test]
fn test_partial_file_gets_defaults() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    std::fs::write(&path, "default_tab = \"Future\"\n").unwrap();

    let cfg = Config::load(&ctx).unwrap();
    assert_eq!(cfg.default_tab, Bucket::Future);
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.request_timeout_secs, 30);
}

#[test]
fn test_broken_file_is_not_treated_as_missing() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    std::fs::write(&path, "default_tab = [").unwrap();

    let err = Config::load(&ctx).unwrap_err();
    assert!(!Config::is_missing_config_error(&err));
    assert!(Config::load_or_default(&ctx).is_err());
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let cfg = Config {
        log_level: "chatty".to_string(),
        ..Config::default()
    };
    assert_eq!(cfg.log_level_filter(), log::LevelFilter::Info);
}
