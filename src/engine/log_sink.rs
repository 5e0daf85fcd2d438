// ==========================================
// MES 核心 OEE 计算 - 诊断日志出口
// ==========================================
// 职责: 定义诊断日志 trait (发出即忘, 不消费返回值)
// 说明: 默认实现转发到 tracing; 测试使用内存实现以便断言条数与级别
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

/// 日志条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
}

// ==========================================
// LogSink Trait
// ==========================================

/// 诊断日志出口
///
/// # 实现说明
/// - `TracingLogSink`: 生产环境, 转发到 tracing 订阅者
/// - `MemoryLogSink`: 单元/集成测试
/// - `NoOpLogSink`: 不需要诊断输出的场景
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, level: LogLevel);
}

/// 转发到 tracing 的日志出口
#[derive(Debug, Clone, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Info => tracing::info!(target: "mes_core_oee::diagnostics", "{}", message),
            LogLevel::Error => tracing::error!(target: "mes_core_oee::diagnostics", "{}", message),
        }
    }
}

/// 空操作日志出口
#[derive(Debug, Clone, Default)]
pub struct NoOpLogSink;

impl LogSink for NoOpLogSink {
    fn log(&self, message: &str, level: LogLevel) {
        tracing::trace!("NoOpLogSink: 丢弃日志 - level={}, message={}", level.as_str(), message);
    }
}

/// 内存日志出口
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录条目的副本
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// 指定级别的条目数
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, message: &str, level: LogLevel) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                message: message.to_string(),
                level,
            });
        }
    }
}
