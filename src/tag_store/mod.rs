// ==========================================
// MES 核心 OEE 计算 - 实时标签库
// ==========================================
// 职责: 定义实时标签读写接口 (批量读 / 批量写)
// 红线: 批量读取必须一次往返完成, 不得拆成 N 次单点读取
// ==========================================

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::{TagStoreError, TagStoreResult};
pub use memory::MemoryTagStore;
pub use sqlite::SqliteTagStore;

use crate::domain::types::TagValue;

// ==========================================
// TagStore Trait
// ==========================================
// 实现者: MemoryTagStore（进程内）、SqliteTagStore（tag_value 表）
pub trait TagStore: Send + Sync {
    /// 批量读取当前值
    ///
    /// # 返回
    /// - 与 paths 同序、同长度的值列表
    /// - 不存在的路径返回 TagValue::Null
    fn read_batch(&self, paths: &[&str]) -> TagStoreResult<Vec<TagValue>>;

    /// 批量写入
    ///
    /// # 错误
    /// - paths 与 values 长度不一致 → BatchLengthMismatch
    fn write_batch(&self, paths: &[&str], values: &[TagValue]) -> TagStoreResult<()>;
}

/// 校验批量写入的长度一致性
pub(crate) fn check_batch_len(paths: &[&str], values: &[TagValue]) -> TagStoreResult<()> {
    if paths.len() != values.len() {
        return Err(TagStoreError::BatchLengthMismatch {
            paths: paths.len(),
            values: values.len(),
        });
    }
    Ok(())
}
