// ==========================================
// MES 核心 OEE 计算 - 计算配置
// ==========================================
// 说明: 默认数据库名等参数随引擎实例显式传递, 不使用模块级全局量
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认数据库名
pub const DEFAULT_DATABASE: &str = "mes_core";

/// 比率无法计算时的回退值
pub const DEFAULT_RATIO_FALLBACK: f64 = 1.0;

/// OEE 计算配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OeeSettings {
    /// 调用方未指定数据库时使用的数据库名
    #[serde(default = "default_database")]
    pub default_database: String,

    /// 分母为零或输入非数值时写入的比率
    #[serde(default = "default_ratio_fallback")]
    pub ratio_fallback: f64,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_ratio_fallback() -> f64 {
    DEFAULT_RATIO_FALLBACK
}

impl Default for OeeSettings {
    fn default() -> Self {
        Self {
            default_database: default_database(),
            ratio_fallback: default_ratio_fallback(),
        }
    }
}

impl OeeSettings {
    /// 解析本次调用的数据库名
    ///
    /// 显式传入时原样使用（空名不回退到默认库）
    pub fn database<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.default_database)
    }
}
