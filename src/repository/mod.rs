// ==========================================
// MES 核心 OEE 计算 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod count_history_repo;
pub mod error;
pub mod queries;
pub mod query_executor;

// 重导出核心仓储
pub use count_history_repo::CountHistoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use query_executor::{QueryExecutor, QueryRow, SqliteQueryExecutor};
