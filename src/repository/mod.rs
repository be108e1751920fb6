// ==========================================
// 客户批量导入管道 - 数据仓储层
// ==========================================
// 职责: 以 SQLite 承接导入核心的外部协作方
// - 客户组目录（只读）
// - 批量导入引擎（append）
// - 客户网格索引重建
// 红线: Repository 不含导入规则，只做数据读写
// ==========================================

pub mod customer_grid_indexer;
pub mod customer_group_repo;
pub mod customer_import_repo;
pub mod error;

// 重导出
pub use customer_grid_indexer::CustomerGridIndexerImpl;
pub use customer_group_repo::CustomerGroupRepositoryImpl;
pub use customer_import_repo::{CustomerImportRepositoryImpl, SqliteBulkImporter};
pub use error::{RepositoryError, RepositoryResult};
