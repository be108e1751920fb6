// ==========================================
// 客户批量导入管道 - 表头解析器
// ==========================================
// 职责: 取第 0 行作为列名，校验必需列齐全
// 红线: 结构问题一律致命，不降级为警告
// ==========================================

use crate::domain::customer::{ColumnSchema, RawRow, REQUIRED_COLUMNS};
use crate::importer::error::SchemaError;
use std::collections::HashSet;
use tracing::debug;

pub struct HeaderResolver {
    required_columns: Vec<String>,
}

impl Default for HeaderResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl HeaderResolver {
    /// 固定必需列始终校验，additional_columns 只在其后追加
    pub fn new(additional_columns: Vec<String>) -> Self {
        let mut required_columns: Vec<String> =
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for column in additional_columns {
            if !required_columns.contains(&column) {
                required_columns.push(column);
            }
        }
        Self { required_columns }
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    /// 解析列结构
    ///
    /// # 参数
    /// - rows: 全部行（第 0 行为表头）
    ///
    /// # 返回
    /// - Ok(ColumnSchema): 列名按原顺序排列
    /// - Err(SchemaError): 无数据 / 表头为空 / 列名重复 / 缺少必需列
    ///
    /// # 说明
    /// - 必需列按配置顺序检查，报告第一个缺失的列
    /// - 表头行不参与后续行处理，由调用方跳过
    pub fn resolve(&self, rows: &[RawRow]) -> Result<ColumnSchema, SchemaError> {
        let header = rows.first().ok_or(SchemaError::NoData)?;
        if header.is_empty() {
            return Err(SchemaError::EmptyHeader);
        }

        let columns: Vec<String> = header.to_vec();
        {
            let mut seen = HashSet::with_capacity(columns.len());
            if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
                return Err(SchemaError::DuplicateColumn(duplicate.clone()));
            }
        }

        for required in &self.required_columns {
            if !columns.iter().any(|c| c == required) {
                return Err(SchemaError::MissingColumn(required.clone()));
            }
        }

        debug!(columns = columns.len(), "表头解析完成");
        Ok(ColumnSchema::new(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> RawRow {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_resolve_valid_header() {
        let rows = vec![
            row(&["email", "_website", "_store", "group_id"]),
            row(&["a@b.com", "base", "default", "1"]),
        ];

        let schema = HeaderResolver::default().resolve(&rows).unwrap();

        assert_eq!(schema.len(), 4);
        assert_eq!(schema.columns()[3], "group_id");
    }

    #[test]
    fn test_resolve_column_order_independent() {
        let rows = vec![row(&["_store", "firstname", "email", "_website"])];

        let schema = HeaderResolver::default().resolve(&rows).unwrap();

        assert_eq!(schema.columns()[0], "_store");
        assert!(schema.contains("email"));
    }

    #[test]
    fn test_resolve_no_rows() {
        let result = HeaderResolver::default().resolve(&[]);
        assert_eq!(result, Err(SchemaError::NoData));
    }

    #[test]
    fn test_resolve_empty_header() {
        let result = HeaderResolver::default().resolve(&[Vec::new()]);
        assert_eq!(result, Err(SchemaError::EmptyHeader));
    }

    #[test]
    fn test_resolve_missing_store() {
        let rows = vec![row(&["email", "_website", "group_id"])];

        let result = HeaderResolver::default().resolve(&rows);

        assert_eq!(result, Err(SchemaError::MissingColumn("_store".to_string())));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let rows = vec![row(&["Email", "_website", "_store"])];

        let result = HeaderResolver::default().resolve(&rows);

        assert_eq!(result, Err(SchemaError::MissingColumn("email".to_string())));
    }

    #[test]
    fn test_resolve_additional_required_columns() {
        let resolver = HeaderResolver::new(vec!["firstname".to_string(), "email".to_string()]);

        assert_eq!(resolver.required_columns(), ["email", "_website", "_store", "firstname"]);
        assert_eq!(
            resolver.resolve(&[row(&["email", "_website", "_store"])]),
            Err(SchemaError::MissingColumn("firstname".to_string()))
        );
        assert!(resolver
            .resolve(&[row(&["email", "_website", "_store", "firstname"])])
            .is_ok());
    }

    #[test]
    fn test_configured_columns_never_drop_fixed_set() {
        let resolver = HeaderResolver::new(vec!["email".to_string()]);

        let result = resolver.resolve(&[row(&["email", "group_id"])]);

        assert_eq!(result, Err(SchemaError::MissingColumn("_website".to_string())));
    }

    #[test]
    fn test_resolve_rejects_duplicate_column() {
        let rows = vec![
            row(&["email", "_website", "_store", "group_id", "group_id"]),
            row(&["a@b.com", "base", "default", "2", "99"]),
        ];

        let result = HeaderResolver::default().resolve(&rows);

        assert_eq!(result, Err(SchemaError::DuplicateColumn("group_id".to_string())));
    }
}
