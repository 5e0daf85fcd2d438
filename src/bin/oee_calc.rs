// Small dev utility: aggregate good/bad counts for one line and recompute its OEE ratios.
//
// Usage:
//   cargo run --bin oee_calc -- [db_path] [line_prefix]
//
// Tag layout (all under the SQLite tag_value table of the same file):
//   {line}/LineID, {line}/StartTime, {line}/EndTime            inputs
//   {line}/Counts/{tag_id}/Good, {line}/Counts/{tag_id}/Bad     per-tag sums
//   {line}/OEE/{GoodCount,TotalCount,TargetCount,RunTime,TotalTime}
//   {line}/OEE/{Quality,Availability,Performance,OEE}           results
//
// Count type ids: 1 = good, 2 = bad.

use anyhow::Context;
use mes_core_oee::config::ConfigManager;
use mes_core_oee::db::open_shared_connection;
use mes_core_oee::engine::{
    CountAggregator, CountQuery, OeeCalculator, OeeContext, OeePaths, TagResolver,
};
use mes_core_oee::repository::{CountHistoryRepository, SqliteQueryExecutor};
use mes_core_oee::tag_store::{SqliteTagStore, TagStore};
use mes_core_oee::{logging, CountKind, TagValue};
use std::path::PathBuf;
use std::sync::Arc;

const GOOD_COUNT_TYPE_ID: i64 = 1;
const BAD_COUNT_TYPE_ID: i64 = 2;

fn default_db_path() -> String {
    if let Ok(path) = std::env::var("MES_OEE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mes_core.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("mes-core-oee");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("mes_core.db");
    }
    path.to_string_lossy().to_string()
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(default_db_path);
    let line = args.next().unwrap_or_else(|| "Line1".to_string());

    tracing::info!(db_path = %db_path, line = %line, "{} v{}", mes_core_oee::APP_NAME, mes_core_oee::VERSION);

    let conn = open_shared_connection(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;
    let settings = ConfigManager::from_connection(conn.clone())?.load_settings()?;
    // 确保 counttag / counthistory 存在
    CountHistoryRepository::from_connection(conn.clone())?;

    let tag_store = Arc::new(SqliteTagStore::from_connection(conn.clone())?);
    let executor =
        Arc::new(SqliteQueryExecutor::new().with_connection(&settings.default_database, conn));
    let ctx = OeeContext::new(tag_store.clone(), executor, settings);

    let resolver = TagResolver::new(ctx.clone());
    let aggregator = CountAggregator::new(ctx.clone());
    let calculator = OeeCalculator::new(ctx);

    let line_id_path = format!("{}/LineID", line);
    let start_path = format!("{}/StartTime", line);
    let end_path = format!("{}/EndTime", line);

    let tag_ids = resolver.get_tag_ids(&line_id_path, None)?;
    tracing::info!(count = tag_ids.len(), "产线计数标签: {:?}", tag_ids);

    let mut good_total = 0_i64;
    let mut bad_total = 0_i64;
    for tag_id in &tag_ids {
        let good_path = format!("{}/Counts/{}/Good", line, tag_id);
        let bad_path = format!("{}/Counts/{}/Bad", line, tag_id);

        good_total += aggregator
            .aggregate(
                CountKind::Good,
                &CountQuery::new(&good_path, &start_path, &end_path, *tag_id, GOOD_COUNT_TYPE_ID),
            )
            .with_context(|| format!("良品汇总失败: tag_id={}", tag_id))?;
        bad_total += aggregator
            .aggregate(
                CountKind::Bad,
                &CountQuery::new(&bad_path, &start_path, &end_path, *tag_id, BAD_COUNT_TYPE_ID),
            )
            .with_context(|| format!("不良品汇总失败: tag_id={}", tag_id))?;
    }

    let oee_path = |name: &str| format!("{}/OEE/{}", line, name);
    let paths = OeePaths {
        total_count: oee_path("TotalCount"),
        good_count: oee_path("GoodCount"),
        target_count: oee_path("TargetCount"),
        run_time: oee_path("RunTime"),
        total_time: oee_path("TotalTime"),
        quality: oee_path("Quality"),
        availability: oee_path("Availability"),
        performance: oee_path("Performance"),
        oee: Some(oee_path("OEE")),
    };

    // 先写汇总计数, 再计算比率
    tag_store.write_batch(
        &[paths.good_count.as_str(), paths.total_count.as_str()],
        &[TagValue::Int(good_total), TagValue::Int(good_total + bad_total)],
    )?;

    let components = calculator.calc_all(&paths)?;
    println!(
        "line={} good={} bad={} quality={:.4} availability={:.4} performance={:.4} oee={:.4}",
        line,
        good_total,
        bad_total,
        components.quality,
        components.availability,
        components.performance,
        components.overall()
    );
    Ok(())
}
