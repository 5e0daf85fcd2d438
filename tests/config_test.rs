// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 配置读取默认值、覆写与快照
// ==========================================


use mes_core_oee::config::{config_keys, ConfigError, ConfigManager, OeeSettings};
use test_helpers::setup_env;

#[test]
fn test_config_manager_creation_on_existing_db() {
    let env = setup_env();
    let manager = ConfigManager::new(&env.db_path);
    assert!(manager.is_ok(), "ConfigManager should be created successfully");
}

#[test]
fn test_settings_default_when_unset() {
    let env = setup_env();
    let manager = ConfigManager::new(&env.db_path).expect("Failed to create ConfigManager");

    let settings = manager.load_settings().expect("Failed to load settings");
    assert_eq!(settings, OeeSettings::default());
    assert_eq!(settings.default_database, "mes_core");
}

#[test]
fn test_settings_survive_reopen() {
    let env = setup_env();
    {
        let manager = ConfigManager::new(&env.db_path).unwrap();
        manager
            .update_config(config_keys::DEFAULT_DATABASE, "plant_b")
            .unwrap();
    }

    let reopened = ConfigManager::new(&env.db_path).unwrap();
    assert_eq!(reopened.load_settings().unwrap().default_database, "plant_b");
}

#[test]
fn test_blank_database_name_rejected() {
    let env = setup_env();
    let manager = ConfigManager::new(&env.db_path).unwrap();
    manager
        .update_config(config_keys::DEFAULT_DATABASE, "   ")
        .unwrap();

    assert!(matches!(
        manager.load_settings(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_non_finite_fallback_rejected() {
    let env = setup_env();
    let manager = ConfigManager::new(&env.db_path).unwrap();
    manager.update_config(config_keys::RATIO_FALLBACK, "inf").unwrap();

    assert!(matches!(
        manager.load_settings(),
        Err(ConfigError::InvalidValue { .. })
    ));
}
