// ==========================================
// MES 核心 OEE 计算 - SQLite 标签库
// ==========================================
// 职责: 管理 tag_value 表 (path → JSON 编码的 TagValue)
// 说明: 批量读写各占一次加锁, 批量写入在同一事务内完成
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::TagValue;
use crate::tag_store::{check_batch_len, TagStore, TagStoreError, TagStoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteTagStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTagStore {
    pub fn new(db_path: &str) -> TagStoreResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> TagStoreResult<Self> {
        let store = Self { conn };
        store.ensure_table()?;
        Ok(store)
    }

    fn get_conn(&self) -> TagStoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TagStoreError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> TagStoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tag_value (
              path TEXT PRIMARY KEY,
              value_json TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }
}

impl TagStore for SqliteTagStore {
    fn read_batch(&self, paths: &[&str]) -> TagStoreResult<Vec<TagValue>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare_cached("SELECT value_json FROM tag_value WHERE path = ?1")?;

        let mut values = Vec::with_capacity(paths.len());
        for path in paths {
            let raw: Option<String> = stmt
                .query_row(params![path], |row| row.get(0))
                .optional()?;

            let value = match raw {
                Some(json) => serde_json::from_str::<TagValue>(&json).map_err(|e| {
                    TagStoreError::ValueDecodeError {
                        path: (*path).to_string(),
                        message: e.to_string(),
                    }
                })?,
                None => TagValue::Null,
            };
            values.push(value);
        }

        Ok(values)
    }

    fn write_batch(&self, paths: &[&str], values: &[TagValue]) -> TagStoreResult<()> {
        check_batch_len(paths, values)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                r#"
                INSERT INTO tag_value (path, value_json, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(path) DO UPDATE SET
                    value_json = excluded.value_json,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for (path, value) in paths.iter().zip(values) {
                let json = serde_json::to_string(value).map_err(|e| {
                    TagStoreError::ValueDecodeError {
                        path: (*path).to_string(),
                        message: e.to_string(),
                    }
                })?;
                stmt.execute(params![path, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
