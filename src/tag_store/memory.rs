// ==========================================
// MES 核心 OEE 计算 - 进程内标签库
// ==========================================
// 用途: 测试与离线计算; 记录读写往返次数以便校验批量约束
// ==========================================

use crate::domain::types::TagValue;
use crate::tag_store::{check_batch_len, TagStore, TagStoreError, TagStoreResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryTagStore {
    values: Mutex<HashMap<String, TagValue>>,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以初始值创建
    pub fn with_values<I, P, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<String>,
        V: Into<TagValue>,
    {
        let map = values
            .into_iter()
            .map(|(p, v)| (p.into(), v.into()))
            .collect::<HashMap<_, _>>();
        Self {
            values: Mutex::new(map),
            ..Self::default()
        }
    }

    fn lock(&self) -> TagStoreResult<MutexGuard<'_, HashMap<String, TagValue>>> {
        self.values
            .lock()
            .map_err(|e| TagStoreError::LockError(e.to_string()))
    }

    /// 直接设置值（不计入写入往返次数）
    pub fn set(&self, path: &str, value: impl Into<TagValue>) -> TagStoreResult<()> {
        self.lock()?.insert(path.to_string(), value.into());
        Ok(())
    }

    /// 直接查看值（不计入读取往返次数）
    pub fn peek(&self, path: &str) -> Option<TagValue> {
        self.lock().ok().and_then(|m| m.get(path).cloned())
    }

    /// read_batch 调用次数
    pub fn read_round_trips(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// write_batch 调用次数
    pub fn write_round_trips(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

impl TagStore for MemoryTagStore {
    fn read_batch(&self, paths: &[&str]) -> TagStoreResult<Vec<TagValue>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let map = self.lock()?;
        Ok(paths
            .iter()
            .map(|p| map.get(*p).cloned().unwrap_or_default())
            .collect())
    }

    fn write_batch(&self, paths: &[&str], values: &[TagValue]) -> TagStoreResult<()> {
        check_batch_len(paths, values)?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut map = self.lock()?;
        for (path, value) in paths.iter().zip(values) {
            map.insert((*path).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_batch_preserves_order_and_defaults_null() {
        let store = MemoryTagStore::with_values([("a", TagValue::Int(1)), ("b", TagValue::Int(2))]);

        let values = store.read_batch(&["b", "missing", "a"]).unwrap();
        assert_eq!(values, vec![TagValue::Int(2), TagValue::Null, TagValue::Int(1)]);
        assert_eq!(store.read_round_trips(), 1);
    }

    #[test]
    fn test_write_batch_length_mismatch() {
        let store = MemoryTagStore::new();
        let result = store.write_batch(&["a", "b"], &[TagValue::Int(1)]);
        assert!(matches!(
            result,
            Err(TagStoreError::BatchLengthMismatch { paths: 2, values: 1 })
        ));
        assert_eq!(store.write_round_trips(), 0);
        assert!(store.peek("a").is_none());
    }
}
