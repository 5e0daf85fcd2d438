// ==========================================
// MES 核心 OEE 计算 - 计数标签解析
// ==========================================
// 职责: 产线 → 计数标签 ID 列表 (counttag.parentID 等值过滤)
// 说明: 外部服务错误不在此处吞掉, 直接返回给调用方
// ==========================================

use crate::engine::context::OeeContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::queries::SELECT_TAG_IDS_BY_LINE;
use tracing::{debug, instrument};

pub struct TagResolver {
    ctx: OeeContext,
}

impl TagResolver {
    pub fn new(ctx: OeeContext) -> Self {
        Self { ctx }
    }

    /// 读取产线 ID 标签, 返回其下全部计数标签 ID
    ///
    /// # 返回
    /// - 查询结果原序（由数据库决定, 不保证有序）
    /// - 无子标签时返回空列表
    #[instrument(skip(self))]
    pub fn get_tag_ids(&self, line_id_path: &str, database: Option<&str>) -> EngineResult<Vec<i64>> {
        let [line_id] = self.ctx.read_tags([line_id_path])?;

        let database = self.ctx.database(database);
        let rows = self
            .ctx
            .executor
            .run_prep_query(SELECT_TAG_IDS_BY_LINE, &[line_id], database)?;

        let tag_ids = rows
            .iter()
            .map(|row| {
                row.first()
                    .ok_or_else(|| "结果行没有列".to_string())
                    .and_then(|value| value.to_i64())
                    .map_err(|message| EngineError::InvalidQueryResult {
                        context: "counttag.ID".to_string(),
                        message,
                    })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        debug!(count = tag_ids.len(), database, "计数标签解析完成");
        Ok(tag_ids)
    }
}
