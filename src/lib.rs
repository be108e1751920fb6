// ==========================================
// 客户批量导入管道 - 核心库
// ==========================================
// 流程: 表头校验 → 客户组规范化 → 批量导入(append) → 客户网格重建
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 管道核心
pub mod importer;

// 数据仓储层 - 外部协作方的 SQLite 实现
pub mod repository;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    ColumnSchema, Diagnostic, DiagnosticLevel, DiagnosticSource, EntityCode, FailureStage,
    ImportBatch, ImportBehavior, NormalizedRow, RawRow, RunResult, RunState,
};

pub use importer::{
    CustomerImporter, CustomerImporterImpl, GroupDirectory, HeaderResolver, ImportError,
    ImportResult, RowNormalizer, SchemaError,
};

pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "客户批量导入管道";
