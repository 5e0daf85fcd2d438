// ==========================================
// MES 核心 OEE 计算 - 比率计算引擎
// ==========================================
// 职责: 质量率 / 可用率 / 性能率 (读两值 → 相除 → 回写一值)
// 红线: 三个比率共用 ratio_metric, 回退值与批量读写规则保持一致
// ==========================================
// 回退规则:
// - 分母为零、输入为空、输入非数值 → 写入并返回配置的回退值 (默认 1.0)
// - 输入非数值额外向诊断日志写一条 error
// - 标签库读写失败不吞掉, 直接返回给调用方
// ==========================================

use crate::domain::count::OeeComponents;
use crate::domain::types::TagValue;
use crate::engine::context::OeeContext;
use crate::engine::error::EngineResult;
use crate::engine::log_sink::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

// ==========================================
// 比率类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatioMetric {
    Quality,      // 良品数 / 总数
    Availability, // 运行时间 / 总时间
    Performance,  // 总数 / 目标数
}

impl RatioMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioMetric::Quality => "QUALITY",
            RatioMetric::Availability => "AVAILABILITY",
            RatioMetric::Performance => "PERFORMANCE",
        }
    }
}

impl fmt::Display for RatioMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 计算结果
// ==========================================

/// 单次比率计算的判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum RatioOutcome {
    /// 正常计算
    Computed(f64),
    /// 分子或分母为空（尚无数据）
    MissingInput,
    /// 分母为零
    ZeroDenominator,
    /// 输入无法转换为数值
    Malformed(String),
}

impl RatioOutcome {
    /// 实际写入的值
    pub fn value_or(&self, fallback: f64) -> f64 {
        match self {
            RatioOutcome::Computed(v) => *v,
            _ => fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, RatioOutcome::Computed(_))
    }
}

/// 比率计算结果（已写入标签库）
#[derive(Debug, Clone, PartialEq)]
pub struct RatioResult {
    pub metric: RatioMetric,
    pub value: f64,
    pub outcome: RatioOutcome,
}

/// 计算 numerator / denominator
///
/// 分子先于分母转换; 任一为空记为 MissingInput
pub fn compute_ratio(numerator: &TagValue, denominator: &TagValue) -> RatioOutcome {
    if numerator.is_null() || denominator.is_null() {
        return RatioOutcome::MissingInput;
    }

    let num = match numerator.to_f64() {
        Ok(v) => v,
        Err(reason) => return RatioOutcome::Malformed(format!("分子: {}", reason)),
    };
    let den = match denominator.to_f64() {
        Ok(v) => v,
        Err(reason) => return RatioOutcome::Malformed(format!("分母: {}", reason)),
    };

    if den == 0.0 {
        return RatioOutcome::ZeroDenominator;
    }

    RatioOutcome::Computed(num / den)
}

// ==========================================
// 计算全部三要素所需的标签路径
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OeePaths {
    pub total_count: String,
    pub good_count: String,
    pub target_count: String,
    pub run_time: String,
    pub total_time: String,
    pub quality: String,
    pub availability: String,
    pub performance: String,
    /// 综合 OEE 写入路径（可选）
    #[serde(default)]
    pub oee: Option<String>,
}

// ==========================================
// OeeCalculator - 比率计算引擎
// ==========================================
pub struct OeeCalculator {
    ctx: OeeContext,
}

impl OeeCalculator {
    pub fn new(ctx: OeeContext) -> Self {
        Self { ctx }
    }

    /// 通用比率计算
    ///
    /// 1. 一次批量读取分子、分母
    /// 2. 计算比率（失败取回退值）
    /// 3. 一次写入目标路径
    #[instrument(skip(self, metric), fields(metric = metric.as_str()))]
    pub fn ratio_metric(
        &self,
        metric: RatioMetric,
        numerator_path: &str,
        denominator_path: &str,
        destination_path: &str,
    ) -> EngineResult<RatioResult> {
        let [numerator, denominator] = self.ctx.read_tags([numerator_path, denominator_path])?;

        let outcome = compute_ratio(&numerator, &denominator);
        match &outcome {
            RatioOutcome::Computed(v) => debug!(value = v, "比率计算完成"),
            RatioOutcome::MissingInput => debug!("输入为空, 使用回退值"),
            RatioOutcome::ZeroDenominator => debug!("分母为零, 使用回退值"),
            RatioOutcome::Malformed(reason) => self.ctx.log_sink.log(
                &format!(
                    "{} 输入无效 ({} / {}): {}",
                    metric, numerator_path, denominator_path, reason
                ),
                LogLevel::Error,
            ),
        }

        let value = outcome.value_or(self.ctx.settings.ratio_fallback);
        self.ctx
            .tag_store
            .write_batch(&[destination_path], &[TagValue::Float(value)])?;

        Ok(RatioResult {
            metric,
            value,
            outcome,
        })
    }

    /// 质量率 = 良品数 / 总数
    pub fn calc_quality(
        &self,
        total_count_path: &str,
        good_count_path: &str,
        quality_path: &str,
    ) -> EngineResult<RatioResult> {
        self.ratio_metric(
            RatioMetric::Quality,
            good_count_path,
            total_count_path,
            quality_path,
        )
    }

    /// 可用率 = 运行时间 / 总时间
    pub fn calc_availability(
        &self,
        run_time_path: &str,
        total_time_path: &str,
        availability_path: &str,
    ) -> EngineResult<RatioResult> {
        self.ratio_metric(
            RatioMetric::Availability,
            run_time_path,
            total_time_path,
            availability_path,
        )
    }

    /// 性能率 = 总数 / 目标数
    pub fn calc_performance(
        &self,
        total_count_path: &str,
        target_count_path: &str,
        performance_path: &str,
    ) -> EngineResult<RatioResult> {
        self.ratio_metric(
            RatioMetric::Performance,
            total_count_path,
            target_count_path,
            performance_path,
        )
    }

    /// 依次计算三要素, 可选写入综合 OEE
    pub fn calc_all(&self, paths: &OeePaths) -> EngineResult<OeeComponents> {
        let quality = self.calc_quality(&paths.total_count, &paths.good_count, &paths.quality)?;
        let availability =
            self.calc_availability(&paths.run_time, &paths.total_time, &paths.availability)?;
        let performance =
            self.calc_performance(&paths.total_count, &paths.target_count, &paths.performance)?;

        let components = OeeComponents {
            quality: quality.value,
            availability: availability.value,
            performance: performance.value,
        };

        if let Some(oee_path) = paths.oee.as_deref() {
            self.ctx
                .tag_store
                .write_batch(&[oee_path], &[TagValue::Float(components.overall())])?;
        }

        Ok(components)
    }
}
