// ==========================================
// MES 核心 OEE 计算 - 领域层
// ==========================================
// 职责: 标签值、计数记录、OEE 结果等纯数据类型
// ==========================================

pub mod count;
pub mod types;

pub use count::{CountRecord, CountTagEntity, OeeComponents};
pub use types::{CountKind, TagValue, TimeWindow};
