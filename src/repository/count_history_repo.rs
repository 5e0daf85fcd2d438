// ==========================================
// MES 核心 OEE 计算 - 计数历史仓储
// ==========================================
// 职责: 管理 counttag / counthistory 表 (建表、写入、查询)
// 说明: 聚合计算走 QueryExecutor 固定查询; 本仓储服务于采集落库、初始化与测试
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::count::{CountRecord, CountTagEntity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CountHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountHistoryRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_tables()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS counttag (
              ID INTEGER PRIMARY KEY,
              ParentID INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS counthistory (
              ID INTEGER PRIMARY KEY AUTOINCREMENT,
              TagID INTEGER NOT NULL,
              CountTypeID INTEGER NOT NULL,
              Count INTEGER NOT NULL,
              TimeStamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_counttag_parent
              ON counttag(ParentID);
            CREATE INDEX IF NOT EXISTS idx_counthistory_tag_type_ts
              ON counthistory(TagID, CountTypeID, TimeStamp);
            "#,
        )?;
        Ok(())
    }

    /// 新增计数标签（挂到产线下）
    pub fn insert_count_tag(&self, entity: &CountTagEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO counttag (ID, ParentID) VALUES (?1, ?2)",
            params![entity.id, entity.parent_id],
        )?;
        Ok(())
    }

    /// 写入一条计数历史
    pub fn record_count(&self, record: &CountRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO counthistory (TagID, CountTypeID, Count, TimeStamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.tag_id,
                record.count_type_id,
                record.count,
                record.time_stamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量写入计数历史（单事务）
    pub fn record_counts(&self, records: &[CountRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO counthistory (TagID, CountTypeID, Count, TimeStamp)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for record in records {
                stmt.execute(params![
                    record.tag_id,
                    record.count_type_id,
                    record.count,
                    record.time_stamp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// 列出某标签某类型的全部计数（按时间升序）
    pub fn list_counts(&self, tag_id: i64, count_type_id: i64) -> RepositoryResult<Vec<CountRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT TagID, CountTypeID, Count, TimeStamp
            FROM counthistory
            WHERE TagID = ?1 AND CountTypeID = ?2
            ORDER BY TimeStamp ASC, ID ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![tag_id, count_type_id], |row| {
                Ok(CountRecord {
                    tag_id: row.get(0)?,
                    count_type_id: row.get(1)?,
                    count: row.get(2)?,
                    time_stamp: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 列出产线下的计数标签
    pub fn list_count_tags(&self, parent_id: i64) -> RepositoryResult<Vec<CountTagEntity>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT ID, ParentID FROM counttag WHERE ParentID = ?1 ORDER BY ID")?;

        let rows = stmt
            .query_map(params![parent_id], |row| {
                Ok(CountTagEntity {
                    id: row.get(0)?,
                    parent_id: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}
