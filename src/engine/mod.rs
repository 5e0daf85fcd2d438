// ==========================================
// MES 核心 OEE 计算 - 引擎层
// ==========================================
// 职责: 比率计算、计数聚合、计数标签解析
// 红线: Engine 不拼 SQL, 只使用 repository::queries 中的固定查询
// ==========================================

pub mod aggregator;
pub mod context;
pub mod error;
pub mod log_sink;
pub mod ratio;
pub mod tag_resolution;

// 重导出核心引擎
pub use aggregator::{CountAggregator, CountQuery};
pub use context::OeeContext;
pub use error::{EngineError, EngineResult};
pub use log_sink::{LogEntry, LogLevel, LogSink, MemoryLogSink, NoOpLogSink, TracingLogSink};
pub use ratio::{compute_ratio, OeeCalculator, OeePaths, RatioMetric, RatioOutcome, RatioResult};
pub use tag_resolution::TagResolver;
