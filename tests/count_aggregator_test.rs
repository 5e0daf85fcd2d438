// ==========================================
// CountAggregator 集成测试
// ==========================================
// 测试目标: counthistory 时间窗口汇总、缺省为 0、良品/不良品哨兵值
// ==========================================


use mes_core_oee::engine::{CountAggregator, CountQuery, EngineError, LogLevel};
use mes_core_oee::repository::RepositoryError;
use mes_core_oee::tag_store::TagStore;
use mes_core_oee::{CountKind, CountRecord, TagValue};
use test_helpers::{setup_env, ts, TestEnv};

const GOOD: i64 = 1;
const BAD: i64 = 2;

/// 标签 5 / 类型 1: 10 @ 08:00:00, 7 @ 08:00:01
/// 标签 5 / 类型 2: 3 @ 08:00:00
/// 标签 6 / 类型 1: 100 @ 08:00:00
fn seed_history(env: &TestEnv) {
    env.history
        .record_counts(&[
            CountRecord::new(5, GOOD, 10, ts(8, 0, 0)),
            CountRecord::new(5, GOOD, 7, ts(8, 0, 1)),
            CountRecord::new(5, BAD, 3, ts(8, 0, 0)),
            CountRecord::new(6, GOOD, 100, ts(8, 0, 0)),
        ])
        .expect("Failed to seed counthistory");
}

fn set_window(env: &TestEnv, start: TagValue, end: TagValue) {
    env.tag_store
        .write_batch(&["L1/StartTime", "L1/EndTime"], &[start, end])
        .expect("Failed to set window");
}

fn read_one(env: &TestEnv, path: &str) -> TagValue {
    env.tag_store.read_batch(&[path]).expect("Failed to read")[0].clone()
}

#[test]
fn test_inclusive_window_sums_matching_rows() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());

    let aggregator = CountAggregator::new(env.ctx.clone());
    let sum = aggregator.get_good_count(&CountQuery::new(
        "L1/Counts/5/Good",
        "L1/StartTime",
        "L1/EndTime",
        5,
        GOOD,
    ));

    assert_eq!(sum, 17);
    assert_eq!(read_one(&env, "L1/Counts/5/Good"), TagValue::Int(17));
}

#[test]
fn test_window_end_excludes_later_rows() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(7, 0, 0).into(), ts(8, 0, 0).into());

    let sum = CountAggregator::new(env.ctx.clone())
        .aggregate(
            CountKind::Good,
            &CountQuery::new("L1/Good", "L1/StartTime", "L1/EndTime", 5, GOOD),
        )
        .unwrap();

    assert_eq!(sum, 10);
}

#[test]
fn test_count_type_and_tag_are_exact_matches() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(0, 0, 0).into(), ts(23, 59, 59).into());

    let aggregator = CountAggregator::new(env.ctx.clone());
    let bad = aggregator.get_bad_count(&CountQuery::new(
        "L1/Counts/5/Bad",
        "L1/StartTime",
        "L1/EndTime",
        5,
        BAD,
    ));
    let other_tag = aggregator.get_good_count(&CountQuery::new(
        "L1/Counts/6/Good",
        "L1/StartTime",
        "L1/EndTime",
        6,
        GOOD,
    ));

    assert_eq!(bad, 3);
    assert_eq!(other_tag, 100);
}

#[test]
fn test_good_count_without_matching_rows_writes_zero() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(12, 0, 0).into(), ts(13, 0, 0).into());

    let sum = CountAggregator::new(env.ctx.clone()).get_good_count(&CountQuery::new(
        "L1/Good",
        "L1/StartTime",
        "L1/EndTime",
        5,
        GOOD,
    ));

    assert_eq!(sum, 0);
    assert_eq!(read_one(&env, "L1/Good"), TagValue::Int(0));
    assert!(env.sink.entries().is_empty());
}

#[test]
fn test_inverted_window_is_empty_sum_not_error() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(9, 0, 0).into(), ts(8, 0, 0).into());

    let result = CountAggregator::new(env.ctx.clone()).aggregate(
        CountKind::Bad,
        &CountQuery::new("L1/Bad", "L1/StartTime", "L1/EndTime", 5, BAD),
    );

    assert_eq!(result.unwrap(), 0);
}

#[test]
fn test_bad_count_query_failure_returns_minus_one() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());

    let query =
        CountQuery::new("L1/Bad", "L1/StartTime", "L1/EndTime", 5, BAD).on_database("unknown_db");
    let sum = CountAggregator::new(env.ctx.clone()).get_bad_count(&query);

    assert_eq!(sum, -1);
    assert_eq!(read_one(&env, "L1/Bad"), TagValue::Null);

    let entries = env.sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, LogLevel::Error);
}

#[test]
fn test_blank_database_name_is_not_replaced_by_default() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());

    let query = CountQuery::new("L1/Bad", "L1/StartTime", "L1/EndTime", 5, BAD).on_database("");
    let result = CountAggregator::new(env.ctx.clone()).aggregate(CountKind::Bad, &query);

    assert!(matches!(
        result,
        Err(EngineError::Repository(RepositoryError::UnknownDatabase(name))) if name.is_empty()
    ));
    assert_eq!(read_one(&env, "L1/Bad"), TagValue::Null);
}

#[test]
fn test_good_count_query_failure_returns_zero_and_keeps_previous_value() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());
    env.tag_store
        .write_batch(&["L1/Good"], &[TagValue::Int(42)])
        .unwrap();

    let query =
        CountQuery::new("L1/Good", "L1/StartTime", "L1/EndTime", 5, GOOD).on_database("unknown_db");
    let aggregator = CountAggregator::new(env.ctx.clone());

    assert!(matches!(
        aggregator.aggregate(CountKind::Good, &query),
        Err(EngineError::Repository(RepositoryError::UnknownDatabase(_)))
    ));
    assert_eq!(aggregator.get_good_count(&query), 0);
    assert_eq!(read_one(&env, "L1/Good"), TagValue::Int(42));
    assert_eq!(env.sink.count(LogLevel::Error), 1);
}

#[test]
fn test_missing_counthistory_table_is_reported() {
    let env = setup_env();
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());
    {
        let conn = mes_core_oee::db::open_sqlite_connection(&env.db_path).unwrap();
        conn.execute_batch("DROP TABLE counthistory;").unwrap();
    }

    let sum = CountAggregator::new(env.ctx.clone()).get_bad_count(&CountQuery::new(
        "L1/Bad",
        "L1/StartTime",
        "L1/EndTime",
        5,
        BAD,
    ));

    assert_eq!(sum, -1);
    assert!(env.sink.entries()[0].message.contains("get_bad_count"));
}

#[test]
fn test_repeated_aggregation_is_idempotent() {
    let env = setup_env();
    seed_history(&env);
    set_window(&env, ts(8, 0, 0).into(), ts(8, 0, 1).into());

    let aggregator = CountAggregator::new(env.ctx.clone());
    let query = CountQuery::new("L1/Good", "L1/StartTime", "L1/EndTime", 5, GOOD);

    let first = aggregator.get_good_count(&query);
    let second = aggregator.get_good_count(&query);

    assert_eq!(first, second);
    assert_eq!(read_one(&env, "L1/Good"), TagValue::Int(17));
}
