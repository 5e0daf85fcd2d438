// ==========================================
// MES 核心 OEE 计算 - 参数化查询执行器
// ==========================================
// 职责: 按数据库名执行参数化查询, 返回按列位置索引的行
// 约束: 只接受位置占位符, 不拼接外部输入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::TagValue;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 查询结果行（按列位置索引）
pub type QueryRow = Vec<TagValue>;

// ==========================================
// QueryExecutor Trait
// ==========================================
// 实现者: SqliteQueryExecutor
pub trait QueryExecutor: Send + Sync {
    /// 执行参数化查询
    ///
    /// # 参数
    /// - sql: 使用 `?` 位置占位符的语句
    /// - params: 与占位符一一对应的参数
    /// - database: 目标数据库名
    fn run_prep_query(
        &self,
        sql: &str,
        params: &[TagValue],
        database: &str,
    ) -> RepositoryResult<Vec<QueryRow>>;
}

// ==========================================
// TagValue ↔ SQLite 值转换
// ==========================================

impl ToSql for TagValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            TagValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            TagValue::Bool(b) => Ok(ToSqlOutput::Owned(Value::Integer(i64::from(*b)))),
            TagValue::Int(v) => Ok(ToSqlOutput::Owned(Value::Integer(*v))),
            // SQLite 会把 NaN 静默存为 NULL, 非有限值直接拒绝绑定
            TagValue::Float(v) if !v.is_finite() => Err(rusqlite::Error::ToSqlConversionFailure(
                format!("非有限浮点数无法作为查询参数: {}", v).into(),
            )),
            TagValue::Float(v) => Ok(ToSqlOutput::Owned(Value::Real(*v))),
            TagValue::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            // 与 rusqlite chrono 写入格式一致, 保证 BETWEEN 按字典序比较正确
            TagValue::Timestamp(ts) => ts.to_sql(),
        }
    }
}

impl FromSql for TagValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(TagValue::Null),
            ValueRef::Integer(v) => Ok(TagValue::Int(v)),
            ValueRef::Real(v) => Ok(TagValue::Float(v)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|s| TagValue::Text(s.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

// ==========================================
// SqliteQueryExecutor
// ==========================================

/// SQLite 查询执行器
///
/// 持有 数据库名 → 连接 的注册表
#[derive(Default)]
pub struct SqliteQueryExecutor {
    databases: HashMap<String, Arc<Mutex<Connection>>>,
}

impl SqliteQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册已有连接
    pub fn with_connection(mut self, database: &str, conn: Arc<Mutex<Connection>>) -> Self {
        self.databases.insert(database.to_string(), conn);
        self
    }

    /// 打开数据库文件并注册
    pub fn open(self, database: &str, db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(self.with_connection(database, Arc::new(Mutex::new(conn))))
    }

    /// 取得已注册连接（供仓储复用）
    pub fn connection(&self, database: &str) -> RepositoryResult<Arc<Mutex<Connection>>> {
        self.databases
            .get(database)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownDatabase(database.to_string()))
    }
}

impl QueryExecutor for SqliteQueryExecutor {
    fn run_prep_query(
        &self,
        sql: &str,
        params: &[TagValue],
        database: &str,
    ) -> RepositoryResult<Vec<QueryRow>> {
        let conn = self.connection(database)?;
        let conn = conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        debug!(database, params = params.len(), sql = sql.trim(), "执行参数化查询");

        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..column_count)
                    .map(|idx| row.get::<_, TagValue>(idx))
                    .collect::<rusqlite::Result<QueryRow>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_executor() -> SqliteQueryExecutor {
        let conn = open_sqlite_connection(":memory:").expect("Failed to open db");
        conn.execute_batch(
            r#"
            CREATE TABLE t (id INTEGER, name TEXT, ratio REAL);
            INSERT INTO t VALUES (1, 'a', 0.5);
            INSERT INTO t VALUES (2, 'b', NULL);
            "#,
        )
        .expect("Failed to seed");
        SqliteQueryExecutor::new().with_connection("mes_core", Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_rows_indexed_by_position() {
        let executor = setup_executor();
        let rows = executor
            .run_prep_query(
                "SELECT id, name, ratio FROM t WHERE id >= ? ORDER BY id",
                &[TagValue::Int(1)],
                "mes_core",
            )
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![TagValue::Int(1), TagValue::from("a"), TagValue::Float(0.5)]);
        assert_eq!(rows[1][2], TagValue::Null);
    }

    #[test]
    fn test_unknown_database() {
        let executor = setup_executor();
        let result = executor.run_prep_query("SELECT 1", &[], "other_db");
        assert!(matches!(result, Err(RepositoryError::UnknownDatabase(name)) if name == "other_db"));
    }

    #[test]
    fn test_non_finite_float_parameter_rejected() {
        let executor = setup_executor();
        for value in [f64::NAN, f64::INFINITY] {
            let result = executor.run_prep_query(
                "SELECT id FROM t WHERE ratio = ?",
                &[TagValue::Float(value)],
                "mes_core",
            );
            assert!(matches!(result, Err(RepositoryError::DatabaseQueryError(_))));
        }
    }

    #[test]
    fn test_parameter_is_not_interpolated() {
        let executor = setup_executor();
        let rows = executor
            .run_prep_query(
                "SELECT id FROM t WHERE name = ?",
                &[TagValue::from("a' OR '1'='1")],
                "mes_core",
            )
            .unwrap();
        assert!(rows.is_empty());
    }
}
