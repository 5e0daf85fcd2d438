// ==========================================
// MES 核心 OEE 计算 - 引擎依赖集合
// ==========================================
// 职责: 聚合计算引擎所需的外部协作者 (标签库 / 查询执行器 / 日志出口) 与配置
// ==========================================

use crate::config::OeeSettings;
use crate::domain::types::TagValue;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::log_sink::{LogSink, TracingLogSink};
use crate::repository::QueryExecutor;
use crate::tag_store::TagStore;
use std::sync::Arc;

/// OEE 引擎依赖集合
///
/// 各引擎共享同一组协作者; 配置随实例显式传递
#[derive(Clone)]
pub struct OeeContext {
    pub tag_store: Arc<dyn TagStore>,
    pub executor: Arc<dyn QueryExecutor>,
    pub log_sink: Arc<dyn LogSink>,
    pub settings: OeeSettings,
}

impl OeeContext {
    /// 创建依赖集合（日志出口默认为 tracing）
    pub fn new(
        tag_store: Arc<dyn TagStore>,
        executor: Arc<dyn QueryExecutor>,
        settings: OeeSettings,
    ) -> Self {
        Self {
            tag_store,
            executor,
            log_sink: Arc::new(TracingLogSink),
            settings,
        }
    }

    /// 替换日志出口
    pub fn with_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    /// 解析本次调用使用的数据库名
    pub fn database<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        self.settings.database(explicit)
    }

    /// 一次往返读取固定数量的标签
    pub(crate) fn read_tags<const N: usize>(&self, paths: [&str; N]) -> EngineResult<[TagValue; N]> {
        let values = self.tag_store.read_batch(&paths)?;
        let actual = values.len();
        <[TagValue; N]>::try_from(values)
            .map_err(|_| EngineError::UnexpectedReadLength { expected: N, actual })
    }
}
