// ==========================================
// 客户批量导入管道 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::customer::{CUSTOMER_GRID_INDEX, CUSTOMER_GROUP_COLUMN, REQUIRED_COLUMNS};
use crate::domain::types::{EntityCode, ImportBehavior};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（内存固定值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取必需列列表
    ///
    /// # 默认值
    /// - ["email", "_website", "_store"]，配置项只能追加，不能移除
    async fn get_required_columns(&self) -> ImportResult<Vec<String>>;

    /// 获取客户组列名
    ///
    /// # 默认值
    /// - "group_id"
    async fn get_group_column(&self) -> ImportResult<String>;

    /// 获取导入实体类型
    ///
    /// # 默认值
    /// - customer_composite
    async fn get_entity_code(&self) -> ImportResult<EntityCode>;

    /// 获取导入行为
    ///
    /// # 默认值
    /// - append（唯一允许的取值）
    async fn get_import_behavior(&self) -> ImportResult<ImportBehavior>;

    /// 获取导入成功后需重建的网格索引 ID
    ///
    /// # 默认值
    /// - "customer_grid"
    async fn get_grid_index_id(&self) -> ImportResult<String>;
}

// ==========================================
// ImportSettings - 单次运行的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub required_columns: Vec<String>,
    pub group_column: String,
    pub entity_code: EntityCode,
    pub behavior: ImportBehavior,
    pub grid_index_id: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            group_column: CUSTOMER_GROUP_COLUMN.to_string(),
            entity_code: EntityCode::CustomerComposite,
            behavior: ImportBehavior::Append,
            grid_index_id: CUSTOMER_GRID_INDEX.to_string(),
        }
    }
}

impl ImportSettings {
    /// 运行开始时一次性读取全部配置
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        Ok(Self {
            required_columns: config.get_required_columns().await?,
            group_column: config.get_group_column().await?,
            entity_code: config.get_entity_code().await?,
            behavior: config.get_import_behavior().await?,
            grid_index_id: config.get_grid_index_id().await?,
        })
    }
}

#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_required_columns(&self) -> ImportResult<Vec<String>> {
        Ok(self.required_columns.clone())
    }

    async fn get_group_column(&self) -> ImportResult<String> {
        Ok(self.group_column.clone())
    }

    async fn get_entity_code(&self) -> ImportResult<EntityCode> {
        Ok(self.entity_code)
    }

    async fn get_import_behavior(&self) -> ImportResult<ImportBehavior> {
        Ok(self.behavior)
    }

    async fn get_grid_index_id(&self) -> ImportResult<String> {
        Ok(self.grid_index_id.clone())
    }
}
