// ==========================================
// MES 核心 OEE 计算 - 标签库错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 标签库错误类型
#[derive(Error, Debug)]
pub enum TagStoreError {
    #[error("标签库锁获取失败: {0}")]
    LockError(String),

    #[error("批量写入长度不一致: paths={paths}, values={values}")]
    BatchLengthMismatch { paths: usize, values: usize },

    #[error("标签库存储失败: {0}")]
    StorageError(String),

    #[error("标签值解析失败 (path={path}): {message}")]
    ValueDecodeError { path: String, message: String },

    #[error("标签库不可用: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for TagStoreError {
    fn from(err: rusqlite::Error) -> Self {
        TagStoreError::StorageError(err.to_string())
    }
}

/// Result 类型别名
pub type TagStoreResult<T> = Result<T, TagStoreError>;
