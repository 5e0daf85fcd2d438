// ==========================================
// MES 核心 OEE 计算 - 配置层
// ==========================================
// 职责: 计算配置 (默认数据库名、比率回退值)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult};
pub use settings::{OeeSettings, DEFAULT_DATABASE, DEFAULT_RATIO_FALLBACK};
