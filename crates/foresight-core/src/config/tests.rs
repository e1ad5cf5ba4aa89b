use super::*;

#[test]
fn test_defaults_when_sections_missing() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.foresight.name, "Foresight");
    assert_eq!(cfg.foresight.log_level, "info");
    assert!(!cfg.foresight.log_file);
    assert_eq!(cfg.pool.path, "foresights");
    assert_eq!(cfg.storage.state_path, "~/.foresight/user-foresights.json");
    assert_eq!(cfg.storage.durability, Durability::BestEffort);
    assert_eq!(cfg.reply.intro, "Ваше передбачення на сьогодні:");
    assert!(cfg.channel.telegram.is_none());
}

#[test]
fn test_full_config_from_toml() {
    let toml_str = r#"
        [foresight]
        data_dir = "/var/lib/foresight"
        log_level = "debug"
        log_file = true

        [pool]
        path = "/etc/foresight/lines.txt"

        [storage]
        state_path = "/var/lib/foresight/state.json"
        durability = "strict"

        [reply]
        intro = "Today:"

        [channel.telegram]
        enabled = true
        bot_token = "123:abc"
        allowed_users = [42, 7]
        poll_interval_ms = 1000
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.foresight.data_dir, "/var/lib/foresight");
    assert!(cfg.foresight.log_file);
    assert_eq!(cfg.pool.path, "/etc/foresight/lines.txt");
    assert_eq!(cfg.storage.durability, Durability::Strict);
    assert_eq!(cfg.reply.intro, "Today:");

    let tg = cfg.channel.telegram.unwrap();
    assert!(tg.enabled);
    assert_eq!(tg.bot_token, "123:abc");
    assert_eq!(tg.allowed_users, vec![42, 7]);
    assert_eq!(tg.poll_interval_ms, 1000);
    assert_eq!(tg.poll_timeout_secs, 30);
}

#[test]
fn test_telegram_config_poll_defaults() {
    let toml_str = r#"
        enabled = true
        bot_token = "tok"
    "#;
    let tg: TelegramConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(tg.poll_interval_ms, 250);
    assert_eq!(tg.poll_timeout_secs, 30);
    assert!(tg.allowed_users.is_empty());
}

#[test]
fn test_unknown_durability_is_rejected() {
    let err = toml::from_str::<StorageConfig>(r#"durability = "sometimes""#);
    assert!(err.is_err());
}

#[test]
fn test_token_override_creates_telegram_section() {
    let mut cfg = Config::default();
    apply_token_override(&mut cfg, Some(" 999:env ".to_string()));
    let tg = cfg.channel.telegram.unwrap();
    assert!(tg.enabled);
    assert_eq!(tg.bot_token, "999:env");
    assert_eq!(tg.poll_interval_ms, 250);
}

#[test]
fn test_token_override_replaces_file_token() {
    let mut cfg: Config = toml::from_str(
        r#"
        [channel.telegram]
        enabled = false
        bot_token = "from-file"
    "#,
    )
    .unwrap();
    apply_token_override(&mut cfg, Some("from-env".to_string()));
    let tg = cfg.channel.telegram.unwrap();
    assert_eq!(tg.bot_token, "from-env");
    // An explicit `enabled = false` is left alone.
    assert!(!tg.enabled);
}

#[test]
fn test_token_override_ignores_blank() {
    let mut cfg = Config::default();
    apply_token_override(&mut cfg, Some("   ".to_string()));
    apply_token_override(&mut cfg, None);
    assert!(cfg.channel.telegram.is_none());
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nope.toml");
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.pool.path, "foresights");
    assert!(cfg.loaded_from.is_none());
}

#[test]
fn test_load_records_source_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[pool]\npath = \"lines.txt\"\n").unwrap();
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.pool.path, "lines.txt");
    assert_eq!(cfg.loaded_from.as_deref(), Some(path.as_path()));
}

#[test]
fn test_load_malformed_file_is_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[storage\nstate_path = ").unwrap();
    let err = load(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ForesightError::Config(_)));
}

#[test]
fn test_shellexpand_leaves_plain_paths() {
    assert_eq!(shellexpand("/tmp/x.json"), "/tmp/x.json");
    assert_eq!(shellexpand("relative/x.json"), "relative/x.json");
}
