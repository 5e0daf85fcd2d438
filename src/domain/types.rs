// ==========================================
// MES 核心 OEE 计算 - 领域类型定义
// ==========================================
// 职责: 标签值 (TagValue)、计数类别 (CountKind)、时间窗口
// 说明: 标签值为动态类型标量, 数值含义由调用方决定, 不做单位换算
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标签值 (Tag Value)
// ==========================================
// 序列化格式: {"type": "...", "value": ...} (SQLite 标签库按 JSON 存储)
// 非有限浮点数按字符串 "inf" / "-inf" / "NaN" 存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

// JSON 不能表示 inf / NaN, 以字符串代替
mod float_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAN: &str = "NaN";
    const POS_INF: &str = "inf";
    const NEG_INF: &str = "-inf";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_sign_positive() {
            serializer.serialize_str(POS_INF)
        } else {
            serializer.serialize_str(NEG_INF)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(s) => match s.as_str() {
                NAN => Ok(f64::NAN),
                POS_INF => Ok(f64::INFINITY),
                NEG_INF => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::custom(format!("无效的浮点数表示: {}", other))),
            },
        }
    }
}

impl TagValue {
    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, TagValue::Null)
    }

    /// 类型名称（用于错误信息）
    pub fn type_name(&self) -> &'static str {
        match self {
            TagValue::Null => "NULL",
            TagValue::Bool(_) => "BOOL",
            TagValue::Int(_) => "INT",
            TagValue::Float(_) => "FLOAT",
            TagValue::Text(_) => "TEXT",
            TagValue::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// 数值转换
    ///
    /// 规则:
    /// - Bool → 0.0 / 1.0
    /// - Int / Float → 原值
    /// - Text → 去除首尾空白后按十进制解析（接受 inf / nan）
    /// - Null / Timestamp → 失败
    pub fn to_f64(&self) -> Result<f64, String> {
        match self {
            TagValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            TagValue::Int(v) => Ok(*v as f64),
            TagValue::Float(v) => Ok(*v),
            TagValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("无法将文本 '{}' 转换为数值: {}", s, e)),
            TagValue::Null | TagValue::Timestamp(_) => {
                Err(format!("{} 类型无法转换为数值", self.type_name()))
            }
        }
    }

    /// 整数转换（计数聚合结果使用）
    ///
    /// - Int → 原值
    /// - Float → 仅当为有限整数值时接受
    /// - Text → 按整数解析
    /// - 其他 → 失败
    pub fn to_i64(&self) -> Result<i64, String> {
        match self {
            TagValue::Int(v) => Ok(*v),
            TagValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(*v as i64),
            TagValue::Float(v) => Err(format!("浮点数 {} 不是整数值", v)),
            TagValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("无法将文本 '{}' 转换为整数: {}", s, e)),
            other => Err(format!("{} 类型无法转换为整数", other.type_name())),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Null => write!(f, "NULL"),
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Text(s) => write!(f, "{}", s),
            TagValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Int(v)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        TagValue::Float(v)
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        TagValue::Bool(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::Text(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        TagValue::Text(v)
    }
}

impl From<NaiveDateTime> for TagValue {
    fn from(v: NaiveDateTime) -> Self {
        TagValue::Timestamp(v)
    }
}

// ==========================================
// 计数类别 (Count Kind)
// ==========================================
// 良品 / 不良品 两类聚合共享同一实现, 仅失败哨兵值不同
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountKind {
    Good, // 良品
    Bad,  // 不良品
}

impl CountKind {
    /// 聚合失败时返回的哨兵值
    ///
    /// - Good → 0
    /// - Bad → -1
    pub fn failure_sentinel(&self) -> i64 {
        match self {
            CountKind::Good => 0,
            CountKind::Bad => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CountKind::Good => "GOOD",
            CountKind::Bad => "BAD",
        }
    }
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 时间窗口 (Time Window)
// ==========================================
// 不校验 start <= end, 反向窗口只会匹配不到任何记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: TagValue,
    pub end: TagValue,
}

impl TimeWindow {
    pub fn new(start: TagValue, end: TagValue) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_f64_coercion() {
        assert_eq!(TagValue::Int(95).to_f64(), Ok(95.0));
        assert_eq!(TagValue::Float(0.5).to_f64(), Ok(0.5));
        assert_eq!(TagValue::Bool(true).to_f64(), Ok(1.0));
        assert_eq!(TagValue::Text(" 12.5 ".to_string()).to_f64(), Ok(12.5));

        assert!(TagValue::Null.to_f64().is_err());
        assert!(TagValue::Text("abc".to_string()).to_f64().is_err());

        let ts = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert!(TagValue::Timestamp(ts).to_f64().is_err());
    }

    #[test]
    fn test_to_i64_rejects_fractional_float() {
        assert_eq!(TagValue::Float(17.0).to_i64(), Ok(17));
        assert!(TagValue::Float(17.5).to_i64().is_err());
        assert!(TagValue::Float(f64::NAN).to_i64().is_err());
        assert!(TagValue::Null.to_i64().is_err());
    }

    #[test]
    fn test_count_kind_sentinel() {
        assert_eq!(CountKind::Good.failure_sentinel(), 0);
        assert_eq!(CountKind::Bad.failure_sentinel(), -1);
    }

    #[test]
    fn test_tag_value_json_roundtrip_shape() {
        let json = serde_json::to_string(&TagValue::Int(5)).unwrap();
        assert_eq!(json, r#"{"type":"INT","value":5}"#);

        let null_json = serde_json::to_string(&TagValue::Null).unwrap();
        assert_eq!(null_json, r#"{"type":"NULL"}"#);
    }

    #[test]
    fn test_non_finite_float_json() {
        let inf = serde_json::to_string(&TagValue::Float(f64::INFINITY)).unwrap();
        assert_eq!(inf, r#"{"type":"FLOAT","value":"inf"}"#);

        let back: TagValue = serde_json::from_str(&inf).unwrap();
        assert_eq!(back, TagValue::Float(f64::INFINITY));

        let nan: TagValue =
            serde_json::from_str(&serde_json::to_string(&TagValue::Float(f64::NAN)).unwrap())
                .unwrap();
        assert!(matches!(nan, TagValue::Float(v) if v.is_nan()));

        let neg: TagValue = serde_json::from_str(r#"{"type":"FLOAT","value":"-inf"}"#).unwrap();
        assert_eq!(neg, TagValue::Float(f64::NEG_INFINITY));

        assert!(serde_json::from_str::<TagValue>(r#"{"type":"FLOAT","value":"abc"}"#).is_err());
        assert_eq!(
            serde_json::from_str::<TagValue>(r#"{"type":"FLOAT","value":0.5}"#).unwrap(),
            TagValue::Float(0.5)
        );
    }
}
