// ==========================================
// 客户批量导入管道 - 行规范化器
// ==========================================
// 职责: 原始行按位置映射为 列名 → 值，并修复无效客户组引用
// 规则: 客户组无效（空值或不在目录中）→ 替换为默认客户组 + 记录一条替换诊断
// 红线: 数据质量问题只做记录自愈，绝不丢行、绝不升级为错误
// ==========================================

use crate::domain::customer::{ColumnSchema, Diagnostic, NormalizedRow, RawRow, CUSTOMER_GROUP_COLUMN};
use crate::importer::error::ImportResult;
use crate::importer::group_directory::GroupDirectory;
use std::collections::HashMap;
use tracing::debug;

pub struct RowNormalizer {
    group_column: String,
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new(CUSTOMER_GROUP_COLUMN)
    }
}

impl RowNormalizer {
    pub fn new(group_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
        }
    }

    pub fn group_column(&self) -> &str {
        &self.group_column
    }

    /// 规范化单行
    ///
    /// # 参数
    /// - row_number: 数据行号（用于诊断）
    /// - raw_row: 原始行
    /// - schema: 列结构
    /// - directory: 客户组目录缓存
    ///
    /// # 返回
    /// - (NormalizedRow, 诊断列表)；当前只有客户组一条规则，诊断至多一条
    /// - Err: 仅当客户组目录拉取失败
    ///
    /// # 长度不一致
    /// - 超出列结构的多余值忽略
    /// - 缺失的列补空字符串（客户组列因此回落到默认值）
    pub async fn normalize(
        &self,
        row_number: usize,
        raw_row: &RawRow,
        schema: &ColumnSchema,
        directory: &GroupDirectory,
    ) -> ImportResult<(NormalizedRow, Vec<Diagnostic>)> {
        let mut values = HashMap::with_capacity(schema.len());
        let mut diagnostics = Vec::new();

        for (idx, column) in schema.iter().enumerate() {
            let raw_value = raw_row.get(idx).map(String::as_str).unwrap_or("");

            let value = if column == self.group_column
                && !directory.is_valid_group(raw_value).await?
            {
                let default_group = directory.default_group_id().await?;
                debug!(row_number, "客户组已替换为默认值");
                diagnostics.push(Diagnostic::substitution(row_number, raw_value, default_group));
                default_group.to_string()
            } else {
                raw_value.to_string()
            };

            values.insert(column.to_string(), value);
        }

        Ok((NormalizedRow::new(row_number, values), diagnostics))
    }
}
