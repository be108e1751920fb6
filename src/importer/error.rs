// ==========================================
// 客户批量导入管道 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: 结构错误（致命） / 客户组查询错误（致命） / 提交与重建错误（可恢复）
// ==========================================

use thiserror::Error;

/// 表头结构错误（致命，运行在任何行处理之前中止）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("导入文件中未找到任何数据")]
    NoData,

    #[error("表头行为空，无法解析列结构")]
    EmptyHeader,

    #[error("缺少必需列: \"{0}\"")]
    MissingColumn(String),

    #[error("表头存在重复列: \"{0}\"")]
    DuplicateColumn(String),
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 结构错误 =====
    #[error(transparent)]
    Schema(#[from] SchemaError),

    // ===== 外部协作方错误 =====
    #[error("客户组查询失败: {0}")]
    GroupResolution(String),

    #[error("批量导入失败: {0}")]
    Submission(String),

    #[error("客户网格索引重建失败: {0}")]
    Reindex(String),

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

impl ImportError {
    /// 是否为表头结构错误
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ImportError::Schema(_))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_column() {
        let err: ImportError = SchemaError::MissingColumn("_store".to_string()).into();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("_store"));
    }

    #[test]
    fn test_submission_error_keeps_cause() {
        let err = ImportError::Submission("duplicate key".to_string());
        assert!(!err.is_schema_error());
        assert!(err.to_string().contains("duplicate key"));
    }
}
