// ==========================================
// MES 核心 OEE 计算 - 固定查询
// ==========================================
// 红线: 查询形态与现场数据库保持一致, 参数一律使用位置占位符
// ==========================================

/// 按产线查询计数标签 ID
///
/// 参数: [产线 ID]
pub const SELECT_TAG_IDS_BY_LINE: &str = "SELECT ID FROM counttag WHERE parentID = ?";

/// 时间窗口内计数求和（两端闭区间）
///
/// 参数: [TagID, CountTypeID, 开始时间, 结束时间]
pub const SUM_COUNT_IN_WINDOW: &str = r#"
    SELECT SUM(Count) FROM counthistory
    WHERE TagID = ? AND CountTypeID = ? AND TimeStamp BETWEEN ? AND ?
"#;
