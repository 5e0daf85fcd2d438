// ==========================================
// MES 核心 OEE 计算 - 核心库
// ==========================================
// 职责: OEE 三要素 (质量率/可用率/性能率) 计算 + 产量计数按时间窗口聚合
// 技术栈: Rust + SQLite
// 系统定位: 计算层 (读实时标签 / 读历史计数 → 计算 → 回写实时标签)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 标签值与计数实体
pub mod domain;

// 实时标签库 - 批量读写
pub mod tag_store;

// 数据仓储层 - 参数化查询与计数历史
pub mod repository;

// 引擎层 - 比率计算 / 计数聚合 / 标签解析
pub mod engine;

// 配置层 - 计算配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigManager, OeeSettings};
pub use domain::{CountKind, CountRecord, CountTagEntity, OeeComponents, TagValue, TimeWindow};
pub use engine::{
    CountAggregator, CountQuery, EngineError, EngineResult, LogLevel, LogSink, OeeCalculator,
    OeeContext, OeePaths, RatioMetric, RatioOutcome, RatioResult, TagResolver,
};
pub use repository::{CountHistoryRepository, QueryExecutor, SqliteQueryExecutor};
pub use tag_store::{MemoryTagStore, SqliteTagStore, TagStore};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MES 核心 OEE 计算";
