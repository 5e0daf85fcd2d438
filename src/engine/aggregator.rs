// ==========================================
// MES 核心 OEE 计算 - 计数聚合引擎
// ==========================================
// 职责: 按 (TagID, CountTypeID, 时间窗口) 汇总 counthistory 并回写标签
// 输入: 标签库中的开始/结束时间 + 计数标签 ID + 计数类型 ID
// 输出: 汇总值写入目标路径
// ==========================================
// 失败策略:
// - aggregate 返回 Result, 保留失败原因
// - get_good_count / get_bad_count 将失败映射为哨兵值 (0 / -1), 并写一条 error 日志
// - 失败发生在写入前时, 目标路径保持不变
// ==========================================

use crate::domain::types::{CountKind, TagValue, TimeWindow};
use crate::engine::context::OeeContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::log_sink::LogLevel;
use crate::repository::queries::SUM_COUNT_IN_WINDOW;
use tracing::{debug, instrument};

/// 计数聚合请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery<'a> {
    pub destination_path: &'a str,
    pub start_time_path: &'a str,
    pub end_time_path: &'a str,
    pub tag_id: i64,
    pub count_type_id: i64,
    /// 目标数据库（None 使用配置的默认库）
    pub database: Option<&'a str>,
}

impl<'a> CountQuery<'a> {
    pub fn new(
        destination_path: &'a str,
        start_time_path: &'a str,
        end_time_path: &'a str,
        tag_id: i64,
        count_type_id: i64,
    ) -> Self {
        Self {
            destination_path,
            start_time_path,
            end_time_path,
            tag_id,
            count_type_id,
            database: None,
        }
    }

    /// 指定数据库
    pub fn on_database(mut self, database: &'a str) -> Self {
        self.database = Some(database);
        self
    }
}

// ==========================================
// CountAggregator - 计数聚合引擎
// ==========================================
pub struct CountAggregator {
    ctx: OeeContext,
}

impl CountAggregator {
    pub fn new(ctx: OeeContext) -> Self {
        Self { ctx }
    }

    /// 汇总计数并写入目标路径
    ///
    /// # 返回
    /// - Ok(sum): 窗口内计数之和（无匹配记录时为 0）
    /// - Err: 读取 / 查询 / 写入任一步失败
    #[instrument(
        skip(self, kind, query),
        fields(
            kind = kind.as_str(),
            tag_id = query.tag_id,
            count_type_id = query.count_type_id
        )
    )]
    pub fn aggregate(&self, kind: CountKind, query: &CountQuery<'_>) -> EngineResult<i64> {
        let [start, end] = self
            .ctx
            .read_tags([query.start_time_path, query.end_time_path])?;
        let window = TimeWindow::new(start, end);

        let database = self.ctx.database(query.database);
        let rows = self.ctx.executor.run_prep_query(
            SUM_COUNT_IN_WINDOW,
            &[
                TagValue::Int(query.tag_id),
                TagValue::Int(query.count_type_id),
                window.start,
                window.end,
            ],
            database,
        )?;

        // 取最后一行第一列; 无行或 NULL 视为 0
        let sum = match rows.last() {
            None => 0,
            Some(row) => match row.first() {
                None => {
                    return Err(EngineError::InvalidQueryResult {
                        context: "counthistory 汇总".to_string(),
                        message: "结果行没有列".to_string(),
                    })
                }
                Some(TagValue::Null) => 0,
                Some(value) => value.to_i64().map_err(|message| {
                    EngineError::InvalidQueryResult {
                        context: "counthistory 汇总".to_string(),
                        message,
                    }
                })?,
            },
        };

        self.ctx
            .tag_store
            .write_batch(&[query.destination_path], &[TagValue::Int(sum)])?;

        debug!(sum, database, "计数汇总完成");
        Ok(sum)
    }

    /// 汇总计数, 失败时记录日志并返回该类别的哨兵值
    pub fn aggregate_or_sentinel(&self, kind: CountKind, query: &CountQuery<'_>) -> i64 {
        match self.aggregate(kind, query) {
            Ok(sum) => sum,
            Err(e) => {
                let op = match kind {
                    CountKind::Good => "get_good_count",
                    CountKind::Bad => "get_bad_count",
                };
                self.ctx
                    .log_sink
                    .log(&format!("Error in {}: {}", op, e), LogLevel::Error);
                kind.failure_sentinel()
            }
        }
    }

    /// 良品数汇总（失败返回 0）
    pub fn get_good_count(&self, query: &CountQuery<'_>) -> i64 {
        self.aggregate_or_sentinel(CountKind::Good, query)
    }

    /// 不良品数汇总（失败返回 -1）
    pub fn get_bad_count(&self, query: &CountQuery<'_>) -> i64 {
        self.aggregate_or_sentinel(CountKind::Bad, query)
    }
}
