// ==========================================
// 客户批量导入管道 - 领域类型定义
// ==========================================
// 职责: 导入实体类型、导入行为、诊断级别、运行状态
// 红线: 导入行为只允许 APPEND（新增或更新，绝不删除/覆盖）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// EntityCode - 导入实体类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCode {
    /// 客户 + 地址复合实体
    CustomerComposite,
}

impl EntityCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCode::CustomerComposite => "customer_composite",
        }
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer_composite" => Ok(EntityCode::CustomerComposite),
            other => Err(format!("不支持的导入实体: {}", other)),
        }
    }
}

// ==========================================
// ImportBehavior - 导入行为
// ==========================================
// 仅保留 APPEND：新增或更新，不删除已有记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportBehavior {
    Append,
}

impl ImportBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportBehavior::Append => "append",
        }
    }
}

impl fmt::Display for ImportBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(ImportBehavior::Append),
            other => Err(format!("导入行为 {} 不被允许（仅支持 append）", other)),
        }
    }
}

// ==========================================
// DiagnosticLevel - 诊断级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticLevel {
    /// 一般信息（导入器跟踪日志、阶段提示）
    Info,
    /// 客户组替换（数据质量自愈，非错误）
    Substitution,
    /// 错误
    Error,
}

// ==========================================
// DiagnosticSource - 诊断来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticSource {
    /// 行规范化
    Normalizer,
    /// 批量提交
    Submission,
    /// 网格索引重建
    Reindex,
    /// 导入器跟踪日志
    ImporterTrace,
    /// 导入器错误消息
    ImporterError,
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticSource::Normalizer => "normalizer",
            DiagnosticSource::Submission => "submission",
            DiagnosticSource::Reindex => "reindex",
            DiagnosticSource::ImporterTrace => "importer_trace",
            DiagnosticSource::ImporterError => "importer_error",
        };
        f.write_str(s)
    }
}

// ==========================================
// FailureStage - 失败阶段
// ==========================================
// 提交失败与重建索引失败必须可区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureStage {
    Submission,
    Reindex,
}

// ==========================================
// RunState - 单次运行状态机
// ==========================================
// Start → SchemaResolved → Normalized → Submitted → Reindexed | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Start,
    SchemaResolved,
    Normalized,
    Submitted,
    Reindexed,
    Failed(FailureStage),
}

impl RunState {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Reindexed | RunState::Failed(_))
    }

    /// 判断状态转换是否合法
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Start, RunState::SchemaResolved) => true,
            (RunState::SchemaResolved, RunState::Normalized) => true,
            (RunState::Normalized, RunState::Submitted) => true,
            (RunState::Normalized, RunState::Failed(FailureStage::Submission)) => true,
            (RunState::Submitted, RunState::Reindexed) => true,
            (RunState::Submitted, RunState::Failed(FailureStage::Reindex)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Start => write!(f, "START"),
            RunState::SchemaResolved => write!(f, "SCHEMA_RESOLVED"),
            RunState::Normalized => write!(f, "NORMALIZED"),
            RunState::Submitted => write!(f, "SUBMITTED"),
            RunState::Reindexed => write!(f, "REINDEXED"),
            RunState::Failed(FailureStage::Submission) => write!(f, "FAILED(SUBMISSION)"),
            RunState::Failed(FailureStage::Reindex) => write!(f, "FAILED(REINDEX)"),
        }
    }
}
