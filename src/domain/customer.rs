// ==========================================
// 客户批量导入管道 - 客户导入领域模型
// ==========================================
// 职责: 列结构、原始行、规范化行、导入批次、诊断、运行结果
// 生命周期: 全部实体只存活于单次管道运行内，核心不持久化任何状态
// ==========================================

use crate::domain::types::{
    DiagnosticLevel, DiagnosticSource, EntityCode, ImportBehavior, RunState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 必需列（精确匹配，区分大小写）
pub const REQUIRED_COLUMNS: [&str; 3] = ["email", "_website", "_store"];

/// 客户组列名
pub const CUSTOMER_GROUP_COLUMN: &str = "group_id";

/// 客户网格索引 ID
pub const CUSTOMER_GRID_INDEX: &str = "customer_grid";

/// 原始行：与 ColumnSchema 按位置对齐的字符串值
pub type RawRow = Vec<String>;

// ==========================================
// ColumnSchema - 列结构
// ==========================================
// 不变量: 非空，且包含全部必需列
// 只能由 HeaderResolver 构造，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    pub(crate) fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

// ==========================================
// NormalizedRow - 规范化行
// ==========================================
// 由唯一一条 RawRow 派生，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// 数据行号（从 1 开始，不含表头）
    pub row_number: usize,
    values: HashMap<String, String>,
}

impl NormalizedRow {
    pub(crate) fn new(row_number: usize, values: HashMap<String, String>) -> Self {
        Self { row_number, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 每次运行仅提交一次；原子性由外部导入子系统保证
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub entity_code: EntityCode,
    pub behavior: ImportBehavior,
    pub rows: Vec<NormalizedRow>,
}

impl ImportBatch {
    pub fn new(entity_code: EntityCode, behavior: ImportBehavior, rows: Vec<NormalizedRow>) -> Self {
        Self {
            entity_code,
            behavior,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// Diagnostic - 诊断信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub source: DiagnosticSource,
    /// 关联的数据行号（运行级诊断为 None）
    pub row_number: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn info(source: DiagnosticSource, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            source,
            row_number: None,
            message: message.into(),
        }
    }

    pub fn error(source: DiagnosticSource, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            source,
            row_number: None,
            message: message.into(),
        }
    }

    /// 客户组替换记录
    pub fn substitution(row_number: usize, original: &str, default_group: &str) -> Self {
        Self {
            level: DiagnosticLevel::Substitution,
            source: DiagnosticSource::Normalizer,
            row_number: Some(row_number),
            message: format!(
                "客户组 ID \"{}\" 无效，已设置为默认值 \"{}\"",
                original, default_group
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn is_substitution(&self) -> bool {
        self.level == DiagnosticLevel::Substitution
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_number {
            Some(row) => write!(f, "[{}] 第 {} 行: {}", self.source, row, self.message),
            None => write!(f, "[{}] {}", self.source, self.message),
        }
    }
}

// ==========================================
// RunResult - 单次运行结果
// ==========================================
// 调用方根据结果自行决定退出状态
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u128,
    /// 已处理的数据行数（不含表头）
    pub total_rows: usize,
    /// 客户组替换次数
    pub substitutions: usize,
    pub state: RunState,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.state == RunState::Reindexed
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}
