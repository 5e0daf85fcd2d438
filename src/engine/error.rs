// ==========================================
// MES 核心 OEE 计算 - 引擎层错误类型
// ==========================================
// 职责: 汇总标签库 / 仓储错误, 以及外部返回数据形态不符
// ==========================================

use crate::repository::RepositoryError;
use crate::tag_store::TagStoreError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("标签库错误: {0}")]
    TagStore(#[from] TagStoreError),

    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("标签库返回数量不符: expected={expected}, actual={actual}")]
    UnexpectedReadLength { expected: usize, actual: usize },

    #[error("查询结果无效 ({context}): {message}")]
    InvalidQueryResult { context: String, message: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
