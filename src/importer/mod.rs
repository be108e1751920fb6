// ==========================================
// 客户批量导入管道 - 导入层
// ==========================================
// 职责: 表头校验、客户组规范化、批次组装与错误汇总
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod customer_importer_impl;
pub mod customer_importer_trait;
pub mod error;
pub mod file_parser;
pub mod group_directory;
pub mod header_resolver;
pub mod row_normalizer;

// 重导出核心类型
pub use customer_importer_impl::CustomerImporterImpl;
pub use error::{ImportError, ImportResult, SchemaError};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use group_directory::GroupDirectory;
pub use header_resolver::HeaderResolver;
pub use row_normalizer::RowNormalizer;

// 重导出 Trait 接口
pub use customer_importer_trait::{
    BulkImporter, BulkImporterFactory, CustomerGroupSource, CustomerImporter, FileParser,
    IndexTrigger,
};
