// ==========================================
// MES 核心 OEE 计算 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::settings::OeeSettings;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置库锁获取失败: {0}")]
    LockError(String),

    #[error("配置库访问失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置快照序列化失败: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const DEFAULT_DATABASE: &str = "oee.default_database";
    pub const RATIO_FALLBACK: &str = "oee.ratio_fallback";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn update_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载 OEE 计算配置
    ///
    /// - 缺失的键使用默认值
    /// - 存在但无法解析的值返回 InvalidValue
    pub fn load_settings(&self) -> ConfigResult<OeeSettings> {
        let mut settings = OeeSettings::default();

        if let Some(db) = self.get_config_value(config_keys::DEFAULT_DATABASE)? {
            let db = db.trim();
            if db.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: config_keys::DEFAULT_DATABASE.to_string(),
                    message: "数据库名不能为空".to_string(),
                });
            }
            settings.default_database = db.to_string();
        }

        if let Some(raw) = self.get_config_value(config_keys::RATIO_FALLBACK)? {
            let fallback = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: config_keys::RATIO_FALLBACK.to_string(),
                    message: e.to_string(),
                })?;
            if !fallback.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: config_keys::RATIO_FALLBACK.to_string(),
                    message: format!("回退值必须为有限数: {}", raw),
                });
            }
            settings.ratio_fallback = fallback;
        }

        tracing::debug!(
            default_database = %settings.default_database,
            ratio_fallback = settings.ratio_fallback,
            "OEE 配置加载完成"
        );
        Ok(settings)
    }

    /// 获取所有配置的快照（JSON格式, 按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}
