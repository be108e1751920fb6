// ==========================================
// 客户批量导入管道 - 领域模型层
// ==========================================
// 职责: 定义导入实体、类型
// 红线: 不含数据访问逻辑，不含导入流程逻辑
// ==========================================

pub mod customer;
pub mod types;

// 重导出核心类型
pub use customer::{
    ColumnSchema, Diagnostic, ImportBatch, NormalizedRow, RawRow, RunResult,
    CUSTOMER_GRID_INDEX, CUSTOMER_GROUP_COLUMN, REQUIRED_COLUMNS,
};
pub use types::{
    DiagnosticLevel, DiagnosticSource, EntityCode, FailureStage, ImportBehavior, RunState,
};
