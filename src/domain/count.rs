// ==========================================
// MES 核心 OEE 计算 - 计数实体
// ==========================================
// 职责: counthistory / counttag 两张外部表的行映射 + OEE 三要素结果
// 红线: 本层只读已有记录, 不负责创建或清理
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 计数历史记录 (counthistory)
///
/// 每条记录属于唯一的 (tag_id, count_type_id) 分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecord {
    pub tag_id: i64,                // 计数标签 ID
    pub count_type_id: i64,         // 计数类型 ID (良品/不良品/报废...)
    pub count: i64,                 // 数量
    pub time_stamp: NaiveDateTime,  // 记录时间
}

impl CountRecord {
    pub fn new(tag_id: i64, count_type_id: i64, count: i64, time_stamp: NaiveDateTime) -> Self {
        Self {
            tag_id,
            count_type_id,
            count,
            time_stamp,
        }
    }
}

/// 计数标签实体 (counttag)
///
/// parent_id 指向产线 ID, 一条产线下可有零个或多个计数标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTagEntity {
    pub id: i64,
    pub parent_id: i64,
}

/// OEE 三要素
///
/// 各比率不做截断, 性能率可能大于 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeComponents {
    pub quality: f64,
    pub availability: f64,
    pub performance: f64,
}

impl OeeComponents {
    /// OEE = 质量率 × 可用率 × 性能率
    pub fn overall(&self) -> f64 {
        self.quality * self.availability * self.performance
    }
}
